//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::backends::scan::WalkOptions;
use crate::core::file_reader::{FileReadConfig, DEFAULT_MAX_FILE_SIZE};
use crate::core::logging::init_logging;
use crate::core::render::{OutputFormat, RenderConfig};
use crate::enhance::api::{PipelineSettings, WriteMode};
use crate::enhance::{
    EnhanceConfig, EnhanceOptions, HeadingTags, DEFAULT_GLYPH_CLASS, DEFAULT_MARKER_CLASS,
    DEFAULT_SECTION_CLASS, DEFAULT_SIDENAV_CLASS,
};

/// docenhance - build side menus and heading anchors for rendered documentation pages.
#[derive(Parser, Debug)]
#[command(name = "docenhance")]
#[command(
    author,
    version,
    about,
    long_about = r#"docenhance post-processes rendered HTML documentation pages.

For every page it:
- rebuilds the side navigation from the headings of each documentation section
- prepends a link marker to every heading that carries an id

Running it again on an enhanced page changes nothing.

Each command except `render` prints a ResultSet in the selected format (default: jsonl).

Output formats:
- jsonl: one JSON object per line (best for piping into tools)
- json: a single JSON array
- md: human-friendly Markdown
- raw: excerpts only (unstable; intended for debugging)

Examples:
    docenhance enhance --check
    docenhance enhance site/docs --write
    docenhance enhance --out-dir public
    docenhance menu docs/index.html --format md
    docenhance render docs/index.html > preview.html
"#
)]
pub struct Cli {
    /// Root directory for all operations.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Root directory for all operations (defaults to the current directory).\n\n\
All paths emitted in results are relative to this root, and positional paths/\n\
scopes are interpreted relative to it."
    )]
    pub root: PathBuf,

    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for ResultSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw\n\n\
Has no effect on `render`, which always prints HTML."
    )]
    pub format: String,

    /// Quiet mode (errors only on stderr).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Only log errors to stderr. Results are still printed to stdout.\n\n\
DOCENHANCE_LOG, when set, takes precedence."
    )]
    pub quiet: bool,

    /// Verbose mode (repeat for more detail).
    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        long_help = "Increase log detail on stderr: -v info, -vv debug, -vvv trace.\n\n\
DOCENHANCE_LOG (an EnvFilter directive such as `docenhance=debug`) takes precedence."
    )]
    pub verbose: u8,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    #[command(flatten)]
    pub page: PageArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Class names, heading tags and limits shared by every command
#[derive(Args, Debug)]
pub struct PageArgs {
    /// Class marking a documentation section.
    #[arg(
        long,
        global = true,
        env = "DOCENHANCE_SECTION_CLASS",
        default_value = DEFAULT_SECTION_CLASS,
        value_name = "CLASS"
    )]
    pub section_class: String,

    /// Class marking the side navigation container.
    #[arg(
        long,
        global = true,
        env = "DOCENHANCE_SIDENAV_CLASS",
        default_value = DEFAULT_SIDENAV_CLASS,
        value_name = "CLASS",
        long_help = "Class marking the side navigation container.\n\n\
The first element carrying it has its contents replaced by the generated menu.\n\
A <ul> or <ol> container receives <li> items directly; any other element\n\
receives a <ul class=\"nav\"> list."
    )]
    pub sidenav_class: String,

    /// Class of the inserted heading anchor.
    #[arg(
        long,
        global = true,
        env = "DOCENHANCE_MARKER_CLASS",
        default_value = DEFAULT_MARKER_CLASS,
        value_name = "CLASS",
        long_help = "Class of the inserted heading anchor.\n\n\
A heading whose direct child already carries this class is left alone, which\n\
makes repeated runs safe. Text inside such anchors never shows up in menu labels."
    )]
    pub marker_class: String,

    /// Class list of the glyph inside the anchor.
    #[arg(
        long,
        global = true,
        env = "DOCENHANCE_GLYPH_CLASS",
        default_value = DEFAULT_GLYPH_CLASS,
        value_name = "CLASSES"
    )]
    pub glyph_class: String,

    /// Tag of top-level headings.
    #[arg(
        long,
        global = true,
        env = "DOCENHANCE_TOP_HEADING",
        default_value = "h1",
        value_name = "TAG"
    )]
    pub top_heading: String,

    /// Tag of sub-level headings.
    #[arg(
        long,
        global = true,
        env = "DOCENHANCE_SUB_HEADING",
        default_value = "h2",
        value_name = "TAG"
    )]
    pub sub_heading: String,

    /// Tag of sub-sub-level headings (anchored, not listed in the menu).
    #[arg(
        long,
        global = true,
        env = "DOCENHANCE_SUBSUB_HEADING",
        default_value = "h3",
        value_name = "TAG"
    )]
    pub subsub_heading: String,

    /// Maximum page size in bytes.
    #[arg(
        long,
        global = true,
        env = "DOCENHANCE_MAX_FILE_SIZE",
        default_value_t = DEFAULT_MAX_FILE_SIZE,
        value_name = "BYTES",
        long_help = "Maximum page size in bytes. Larger pages are reported as FILE_TOO_LARGE\n\
errors and left untouched."
    )]
    pub max_file_size: u64,
}

impl PageArgs {
    /// Enhancer configuration from the flags
    pub fn enhance_config(&self) -> EnhanceConfig {
        EnhanceConfig {
            section_class: self.section_class.clone(),
            sidenav_class: self.sidenav_class.clone(),
            marker_class: self.marker_class.clone(),
            glyph_class: self.glyph_class.clone(),
            headings: HeadingTags {
                top: self.top_heading.to_ascii_lowercase(),
                sub: self.sub_heading.to_ascii_lowercase(),
                subsub: self.subsub_heading.to_ascii_lowercase(),
            },
        }
    }

    pub fn read_config(&self) -> FileReadConfig {
        FileReadConfig {
            max_file_size: self.max_file_size,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enhance pages: rebuild side menus and add heading anchors.
    #[command(
        long_about = "Enhance HTML pages and emit one `page` ResultItem per page.\n\n\
Without --write or --out-dir nothing is written; results report whether each\n\
page would change. Pages that fail to read or write are reported as `error`\n\
items and the rest of the batch continues.\n\n\
Examples:\n\
  docenhance enhance\n\
  docenhance enhance docs/index.html docs/guide --write\n\
  docenhance enhance --out-dir public --format md\n\
  docenhance enhance --check\n"
    )]
    Enhance {
        /// Pages or directories to enhance (defaults to ROOT).
        #[arg(
            value_name = "PATHS",
            long_help = "Pages or directories to enhance, relative to ROOT.\n\n\
Directories are searched for .html/.htm files, honoring .gitignore. If omitted,\n\
ROOT is searched."
        )]
        paths: Vec<PathBuf>,

        /// Overwrite pages that change.
        #[arg(long, conflicts_with = "out_dir")]
        write: bool,

        /// Write every enhanced page below DIR, mirroring paths under ROOT.
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Exit with status 1 if any page would change.
        #[arg(
            long,
            conflicts_with_all = ["write", "out_dir"],
            long_help = "Exit with status 1 if any page would change; nothing is written.\n\n\
Useful in CI to verify a site has already been enhanced."
        )]
        check: bool,

        /// Leave side navigation untouched.
        #[arg(long)]
        no_menu: bool,

        /// Do not insert heading anchors.
        #[arg(long)]
        no_anchors: bool,

        /// Include hidden files/directories when searching directories.
        #[arg(long)]
        hidden: bool,

        /// Do not respect ignore files when searching directories.
        #[arg(long)]
        no_ignore: bool,
    },

    /// Show the side menu a page would get.
    #[command(
        long_about = "Emit one `menu` ResultItem per top-level menu entry of a page, in document\n\
order. Each item's data holds the entry id, label and nested links.\n\n\
The page is not modified.\n\n\
Examples:\n\
  docenhance menu docs/index.html\n\
  docenhance menu docs/index.html --format md\n"
    )]
    Menu {
        /// Page to inspect (relative to ROOT).
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the enhanced HTML of one page to stdout.
    #[command(
        long_about = "Enhance one page in memory and print the resulting HTML to stdout.\n\n\
The page on disk is not modified. --format is ignored.\n\n\
Examples:\n\
  docenhance render docs/index.html > preview.html\n\
  docenhance render docs/index.html --no-anchors\n"
    )]
    Render {
        /// Page to render (relative to ROOT).
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Leave side navigation untouched.
        #[arg(long)]
        no_menu: bool,

        /// Do not insert heading anchors.
        #[arg(long)]
        no_anchors: bool,
    },

    /// List HTML pages under ROOT.
    #[command(
        long_about = "Scan the filesystem under ROOT (or an optional --scope) and emit one\n\
`file` ResultItem per .html/.htm page. Output is sorted for stability.\n\n\
Examples:\n\
  docenhance scan\n\
  docenhance scan --scope docs --max-depth 2\n\
  docenhance scan --hidden --no-ignore\n"
    )]
    Scan {
        /// Limit scanning to a subdirectory under ROOT.
        #[arg(
            long,
            value_name = "PATH",
            long_help = "Limit scanning to a subdirectory under ROOT.\n\n\
If omitted, ROOT is scanned. Paths in results stay relative to ROOT."
        )]
        scope: Option<PathBuf>,

        /// Maximum directory depth from the scan start.
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        /// Include hidden files/directories (dotfiles).
        #[arg(
            long,
            long_help = "Include hidden files and directories (dotfiles).\n\n\
By default, hidden entries are skipped."
        )]
        hidden: bool,

        /// Do not respect ignore files (.gitignore, .ignore).
        #[arg(
            long,
            long_help = "Do not respect ignore files (.gitignore, .ignore, global excludes).\n\n\
By default, ignored paths are skipped."
        )]
        no_ignore: bool,
    },
}

/// Run the CLI command; the exit code is 1 only when `enhance --check` finds work
pub fn run(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.verbose, cli.quiet);

    let format: OutputFormat = cli.format.parse().map_err(anyhow::Error::msg)?;
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    let config = cli.page.enhance_config();
    config.validate()?;

    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("cannot open root {}", cli.root.display()))?;
    debug!(root = %root.display(), ?format, "starting");

    let mut settings = PipelineSettings {
        config,
        options: EnhanceOptions::default(),
        read: cli.page.read_config(),
        write: WriteMode::DryRun,
    };

    match cli.command {
        Commands::Enhance {
            paths,
            write,
            out_dir,
            check,
            no_menu,
            no_anchors,
            hidden,
            no_ignore,
        } => {
            settings.options = EnhanceOptions {
                menu: !no_menu,
                anchors: !no_anchors,
            };
            settings.write = match out_dir {
                Some(dir) => WriteMode::OutDir(crate::core::paths::resolve(&root, &dir)),
                None if write => WriteMode::InPlace,
                None => WriteMode::DryRun,
            };
            let walk = WalkOptions {
                max_depth: None,
                hidden,
                ignore: !no_ignore,
            };

            let changed =
                crate::enhance::api::run_enhance(&root, &paths, walk, &settings, render_config)?;
            if check && changed {
                return Ok(ExitCode::from(1));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Menu { file } => {
            crate::enhance::api::run_menu(&root, &file, &settings, render_config)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Render {
            file,
            no_menu,
            no_anchors,
        } => {
            settings.options = EnhanceOptions {
                menu: !no_menu,
                anchors: !no_anchors,
            };
            crate::enhance::api::run_render(&root, &file, &settings)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Scan {
            scope,
            max_depth,
            hidden,
            no_ignore,
        } => {
            let walk = WalkOptions {
                max_depth,
                hidden,
                ignore: !no_ignore,
            };
            crate::backends::scan::run_scan(&root, scope.as_deref(), walk, render_config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

//! image-captions - number and caption the figures of a book

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, debug};
use rayon::prelude::*;

use image_captions::book::{BookSource, DirectoryBook, Page};
use image_captions::{Error, ImageCaptions, ImageRegistry, Result, Variables};

#[derive(Parser)]
#[command(name = "image-captions")]
#[command(version, about = "Wrap book images in numbered figures", long_about = None)]
#[command(after_help = "EXAMPLES:
    image-captions my-book                    Write captioned pages to my-book/_book
    image-captions my-book -o site            Write captioned pages to site/
    image-captions -l my-book                 List the book's figures
    image-captions my-book --registry f.json  Also save the figure list as JSON")]
struct Cli {
    /// Book directory (with SUMMARY.md, README.md and optional book.json)
    #[arg(value_name = "BOOK_DIR")]
    book: PathBuf,

    /// Output directory for rewritten pages [default: BOOK_DIR/_book]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Write the figure registry as JSON to FILE
    #[arg(long, value_name = "FILE")]
    registry: Option<PathBuf>,

    /// List the book's figures instead of writing pages
    #[arg(short, long)]
    list: bool,

    /// Suppress output messages
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log each page as it is processed
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let book = DirectoryBook::open(&cli.book)?;
    let plugin = ImageCaptions::from_book(book.config())?;
    let mut vars = Variables::from(book.config().variables.clone());

    let session = plugin.on_init(&book, &mut vars)?;

    if let Some(path) = &cli.registry {
        write_registry(session.registry(), path)?;
    }

    if cli.list {
        print_registry(session.registry());
        return Ok(());
    }

    let out_dir = cli.output.clone().unwrap_or_else(|| book.root().join("_book"));
    let pages = book.pages();
    pages.par_iter().try_for_each(|page_ref| {
        let mut page = book.load_page(page_ref)?;
        session.on_page(&mut page)?;
        write_page(&out_dir, &page)
    })?;

    if !cli.quiet {
        println!(
            "{} pages, {} figures -> {}",
            pages.len(),
            session.registry().len(),
            out_dir.display()
        );
    }
    Ok(())
}

fn write_registry(registry: &ImageRegistry, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(registry)?;
    std::fs::write(path, json).map_err(|e| Error::io(path, e))
}

fn print_registry(registry: &ImageRegistry) {
    for image in registry {
        println!("{:>4}  {:<10} {}  ({})", image.nro, image.key, image.list_caption, image.backlink);
    }
}

fn write_page(out_dir: &Path, page: &Page) -> Result<()> {
    let path = out_dir.join(&page.path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let body = if page.sections.is_empty() {
        page.content.clone()
    } else {
        page.sections.iter().map(|s| s.content.as_str()).collect()
    };
    debug!("writing {}", path.display());
    std::fs::write(&path, body).map_err(|e| Error::io(&path, e))
}

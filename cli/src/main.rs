//! pdf2md CLI - convert PDF documents to Markdown.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;

use pdf2md::{PageSelection, ParseOptions, PdfParser, RenderOptions};

#[derive(Parser)]
#[command(name = "pdf2md")]
#[command(version)]
#[command(about = "Convert a PDF document to Markdown", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Page range (e.g., "1-10", "1,3,5-7")
    #[arg(long, value_name = "RANGE")]
    pages: Option<String>,

    /// Password for encrypted documents
    #[arg(long, value_name = "PASSWORD")]
    password: Option<String>,

    /// Include YAML frontmatter with document metadata
    #[arg(short, long)]
    frontmatter: bool,

    /// Extract embedded images into DIR and emit links to them
    #[arg(long, value_name = "DIR")]
    images: Option<PathBuf>,

    /// Suppress the horizontal rule between pages
    #[arg(long)]
    no_page_breaks: bool,

    /// Maximum heading level (1-6)
    #[arg(long, default_value = "6", value_name = "LEVEL")]
    max_heading: u8,

    /// Fail on page extraction errors instead of skipping unreadable pages
    #[arg(long)]
    strict: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = match cli.pages.as_deref() {
        Some(spec) => PageSelection::parse(spec)?,
        None => PageSelection::All,
    };

    let mut parse_options = ParseOptions::new()
        .with_pages(page_selection)
        .with_images(cli.images.is_some());
    if cli.strict {
        parse_options = parse_options.strict();
    }
    if let Some(ref password) = cli.password {
        parse_options = parse_options.with_password(password.clone());
    }

    let parser = PdfParser::open_with_options(&cli.input, parse_options)?;
    let doc = parser.parse()?;

    let mut render_options = RenderOptions::new()
        .with_frontmatter(cli.frontmatter)
        .with_page_separator(!cli.no_page_breaks)
        .with_max_heading(cli.max_heading);

    if let Some(ref dir) = cli.images {
        let prefix = format!("{}/", dir.display().to_string().trim_end_matches('/'));
        render_options = render_options.with_images(prefix);
        export_images(&doc, dir)?;
    }

    let markdown = pdf2md::render::to_markdown_with_options(&doc, &render_options);

    match cli.output {
        Some(ref path) => {
            fs::write(path, &markdown)?;
            eprintln!("{} {}", "Saved to".green(), path.display());
        }
        None => {
            print!("{}", markdown);
        }
    }

    Ok(())
}

/// Write the document's embedded images into `dir`.
fn export_images(doc: &pdf2md::Document, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if doc.resources.is_empty() {
        return Ok(());
    }

    fs::create_dir_all(dir)?;

    let mut count = 0;
    for (id, resource) in &doc.resources {
        if resource.is_image() {
            let filename = resource.suggested_filename(id);
            fs::write(dir.join(&filename), &resource.data)?;
            count += 1;
        }
    }

    log::info!("extracted {} images to {}", count, dir.display());
    Ok(())
}

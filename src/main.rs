//! book-reader 命令行
//!
//! 用法:
//!   book-reader parse <FILE>            解析本地文本，输出文档 JSON
//!   book-reader toc <FILE>              输出目录及每章起始页
//!   book-reader page <FILE> --page N    输出某一页
//!   book-reader fetch <URL> --id --title  下载、解析并保存，输出详情页
//!   book-reader batch <BOOKS.json>      并发解析一批书籍

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use book_reader::async_parse::{enqueue_books, process_parse_queue};
use book_reader::parser::decoder::decode_raw_text;
use book_reader::{
    BookRef, BookService, Document, HttpTextFetcher, Paginator, ParseQueue, ReaderConfig,
    Result, SqliteDocumentStore, TextParser,
};

#[derive(Parser)]
#[command(name = "book-reader", version, about = "纯文本公版书解析与分页")]
struct Cli {
    /// 配置文件路径（TOML），不存在时使用默认配置
    #[arg(long, global = true, default_value = "book-reader.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 解析本地文本文件，输出文档 JSON
    Parse {
        file: PathBuf,
        /// 书名（默认取文件名）
        #[arg(long)]
        title: Option<String>,
        /// 输出文件（默认输出到标准输出）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// 输出目录及每章起始页
    Toc { file: PathBuf },
    /// 输出某一页
    Page {
        file: PathBuf,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        page: i64,
        /// 每页句子数（覆盖配置文件）
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// 下载、解析并保存，输出详情页
    Fetch {
        url: String,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "EN")]
        language: String,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        page: i64,
    },
    /// 并发下载并解析一批书籍（JSON 数组: [{id, title, language, textUrl}]）
    Batch { books: PathBuf },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchReport {
    key: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = ReaderConfig::load(&cli.config)?;

    match cli.command {
        Commands::Parse { file, title, output } => {
            let document = parse_file(&config, &file, title)?;
            let json = serde_json::to_string_pretty(&document)?;
            match output {
                Some(path) => fs::write(path, json)?,
                None => println!("{}", json),
            }
            Ok(())
        }
        Commands::Toc { file } => {
            let document = parse_file(&config, &file, None)?;
            let positions = TextParser::new(config.parse_options()).locate_chapters(&document);
            let chapters = Paginator::new(config.page_size)?.chapter_infos(&positions);
            print_json(&chapters)
        }
        Commands::Page {
            file,
            page,
            page_size,
        } => {
            let document = parse_file(&config, &file, None)?;
            let parser = TextParser::new(config.parse_options());
            let positions = parser.locate_chapters(&document);
            let paginator = Paginator::new(page_size.unwrap_or(config.page_size))?;
            print_json(&paginator.detail_page(&document, &positions, page))
        }
        Commands::Fetch {
            url,
            id,
            title,
            language,
            page,
        } => {
            let fetcher = HttpTextFetcher::new(&config)?;
            let store = SqliteDocumentStore::open(&config.database_path)?;
            let service = BookService::new(fetcher, store, &config)?;
            let book = BookRef {
                id,
                title,
                language,
                text_url: url,
            };
            print_json(&service.detail_page(&book, page)?)
        }
        Commands::Batch { books } => {
            let books: Vec<BookRef> = serde_json::from_slice(&fs::read(books)?)?;
            let service = Arc::new(BookService::new(
                HttpTextFetcher::new(&config)?,
                SqliteDocumentStore::open(&config.database_path)?,
                &config,
            )?);
            let queue = Arc::new(ParseQueue::new(config.max_concurrent_parses));
            enqueue_books(&queue, books)?;

            let runtime = tokio::runtime::Runtime::new()?;
            let outcomes = runtime.block_on(process_parse_queue(service, queue));
            let reports: Vec<_> = outcomes
                .into_iter()
                .map(|outcome| BatchReport {
                    key: outcome.key,
                    ok: outcome.result.is_ok(),
                    error: outcome.result.err().map(|e| e.to_string()),
                })
                .collect();
            print_json(&reports)
        }
    }
}

fn parse_file(config: &ReaderConfig, file: &Path, title: Option<String>) -> Result<Document> {
    let bytes = fs::read(file)?;
    let raw = decode_raw_text(&bytes);
    let title = title.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    Ok(TextParser::new(config.parse_options()).parse(&raw, &title))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

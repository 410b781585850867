//! book_finder 交互式终端
//!
//! 输入关键词检索图书，`save <id>` 收藏；退出时（含出错、Ctrl-C、EOF）总会写入本地快照。

use book_finder::prelude::*;
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "book_finder")]
#[command(about = "Search the book catalog and save books to your collection")]
#[command(version)]
struct Args {
    /// YAML 配置文件；缺省时从环境变量 / .env 读取
    #[arg(short, long, env = "BOOK_FINDER_CONFIG")]
    config: Option<String>,

    /// 登录 token（JWT）
    #[arg(short, long, env = "BOOK_FINDER_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "book_finder=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };
    info!(search = %config.search.base_url, backend = %config.backend.graphql_url, "配置已加载");

    let client = Arc::new(config.http_client()?);
    let auth = Arc::new(SessionAuth::new());
    if let Some(token) = args.token {
        auth.login(token);
    }

    let view = SaveReconciler::new(
        SearchNormalizer::new(Arc::new(GoogleBooksProvider::new(
            client.clone(),
            config.search.base_url.clone(),
        ))),
        auth.clone(),
        Arc::new(GraphqlBackend::new(client, config.backend.graphql_url.clone())),
        SavedIdStore::open(&config.store.path),
    );

    // 网络请求进行中按 Ctrl-C 也要走到 close()
    let outcome = run_until_shutdown(run_repl(&view, &auth), tokio::signal::ctrl_c()).await;
    let closed = view.close();
    outcome?;
    closed
}

/// 运行 `work`，直到完成或 `shutdown` 触发；两种情况都正常返回，交由调用方收尾
async fn run_until_shutdown<W, S, T>(work: W, shutdown: S) -> Result<()>
where
    W: Future<Output = Result<()>>,
    S: Future<Output = T>,
{
    tokio::select! {
        outcome = work => outcome,
        _ = shutdown => {
            info!("收到中断信号，准备退出");
            Ok(())
        }
    }
}

async fn run_repl(view: &SaveReconciler, auth: &SessionAuth) -> Result<()> {
    let mut rl = DefaultEditor::new().map_err(|e| BookError::Other(e.to_string()))?;

    println!("=== Search for Books! ===");
    print_help();
    render(view);

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(BookError::Other(e.to_string())),
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        let (command, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
        let rest = rest.trim();
        match command {
            "quit" | "exit" => break,
            "help" => print_help(),
            "login" if !rest.is_empty() => {
                auth.login(rest);
                if !auth.is_logged_in() {
                    println!("Token is invalid or expired.");
                }
                render(view);
            }
            "logout" => {
                auth.logout();
                render(view);
            }
            "saved" => {
                let mut ids: Vec<String> = view.saved_ids().into_iter().collect();
                ids.sort();
                println!("Saved book ids ({}): {}", ids.len(), ids.join(", "));
            }
            "save" if !rest.is_empty() => match view.save(rest).await {
                Ok(()) => {
                    println!("Saved {}.", rest);
                    render(view);
                }
                Err(e) => println!("Could not save {}: {}", rest, e),
            },
            "search" => submit_search(view, rest).await,
            _ => submit_search(view, trimmed).await,
        }
    }
    Ok(())
}

// 检索失败只提示，视图保持可用
async fn submit_search(view: &SaveReconciler, query: &str) {
    match view.search(query).await {
        Ok(SearchOutcome::Applied { .. }) => render(view),
        Ok(SearchOutcome::Stale) => {}
        Err(BookError::Search(SearchError::EmptyQuery)) => {}
        Err(e) => println!("something went wrong! ({})", e),
    }
}

fn render(view: &SaveReconciler) {
    let results = view.results();
    println!();
    if results.is_empty() {
        println!("Search for a book to begin");
        return;
    }
    println!("Viewing {} results:", results.len());

    let logged_in = view.is_logged_in();
    for record in &results {
        println!("------------------------------------------------------------");
        println!("{}  [{}]", record.title(), record.id());
        println!("Authors: {}", record.authors().join(", "));
        if !record.description().is_empty() {
            println!("{}", record.description());
        }
        if !record.image_url().is_empty() {
            println!("Cover: {}", record.image_url());
        }
        if logged_in {
            if view.is_saved(record.id()) {
                println!("This book has already been saved!");
            } else {
                println!("Save this Book! -> save {}", record.id());
            }
        }
    }
    println!();
}

fn print_help() {
    println!("  <keywords> | search <keywords>   search the catalog");
    println!("  save <id>                         save a book from the results");
    println!("  saved                             list saved book ids");
    println!("  login <token> | logout            change login state");
    println!("  quit                              exit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use book_finder::store::InMemoryKvStore;
    use book_finder::testing::{MockAuthGate, MockSearchProvider, MockWriteBackend, volume};
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_shutdown_interrupts_pending_request_and_view_still_closes() {
        let kv = Arc::new(InMemoryKvStore::new());
        let gate = Arc::new(Notify::new());
        let view = SaveReconciler::new(
            SearchNormalizer::new(Arc::new(
                MockSearchProvider::new()
                    .with_volumes(vec![volume("A1", "The Hobbit")])
                    .with_gated_volumes(vec![volume("B2", "Dune")], gate),
            )),
            Arc::new(MockAuthGate::logged_in("tok")),
            Arc::new(MockWriteBackend::new()),
            SavedIdStore::new(kv.clone()),
        );
        view.search("hobbit").await.unwrap();
        view.save("A1").await.unwrap();

        // 第二次检索一直挂起，直到中断信号到来
        let work = async {
            view.search("dune").await?;
            Ok(())
        };
        run_until_shutdown(work, async {}).await.unwrap();

        view.close().unwrap();
        let saved = SavedIdStore::new(kv).load();
        assert!(saved.contains("A1"));
        assert_eq!(saved.len(), 1);
    }

    #[tokio::test]
    async fn test_work_error_is_returned() {
        let work = async { Err(BookError::Other("readline failed".to_string())) };
        let outcome = run_until_shutdown(work, std::future::pending::<()>()).await;
        assert!(matches!(outcome, Err(BookError::Other(_))));
    }
}

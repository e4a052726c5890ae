//! Interactive advisory session on the terminal, against the configured
//! database and model endpoint.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;

use advisor_agent::{AdvisorRuntime, OpenAiClient};
use advisor_core::audit::TracingAuditSink;
use advisor_core::config::AppConfig;
use advisor_index::{connect, migrations, SqlDocumentIndex};

use super::{load_config, run_blocking, CommandResult, StageFailure};

pub fn run() -> CommandResult {
    let config = match load_config("chat") {
        Ok(config) => config,
        Err(result) => return result,
    };

    run_blocking("chat", async move {
        run_session(config)
            .await
            .map_err(|error| StageFailure::new("session", format!("{error:#}"), 4))?;
        Ok("session ended".to_string())
    })
}

async fn run_session(config: AppConfig) -> anyhow::Result<()> {
    let pool = connect(&config.database).await.context("failed to connect to database")?;
    migrations::run_pending(&pool).await.context("failed to apply migrations")?;

    let index = Arc::new(SqlDocumentIndex::new(pool.clone()));
    let llm =
        Arc::new(OpenAiClient::from_config(&config.llm).context("failed to build llm client")?);
    let advisor = AdvisorRuntime::new(llm, index, Arc::new(TracingAuditSink));

    let mut session = advisor.open_session();
    for message in &session.messages {
        println!("advisor> {}", message.content);
    }
    println!("(type `exit` to end the session)");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("you> ");
        io::stdout().flush().context("failed to flush stdout")?;

        line.clear();
        let read = stdin.lock().read_line(&mut line).context("failed to read input")?;
        if read == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "exit" || text == "quit" {
            break;
        }

        for reply in advisor.handle_message(&mut session, text).await {
            println!("advisor> {reply}");
        }
    }

    pool.close().await;
    Ok(())
}

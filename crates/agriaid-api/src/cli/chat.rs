//! Terminal chat loop that drives the message router like an SMS thread.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::state::AppState;

pub async fn run(state: &AppState, phone: &str) -> anyhow::Result<()> {
    println!();
    println!(
        "  {} AgriAid chat as {}",
        console::style("🌱").bold(),
        console::style(phone).cyan()
    );
    println!(
        "  {}",
        console::style("Type a message and press Enter. 'exit' quits.").dim()
    );
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = state.router.process(phone, text, &state.session).await;
        println!();
        println!("  {} {}", console::style("AgriAid:").green().bold(), reply);
        println!();
    }

    println!("  Goodbye.");
    Ok(())
}

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use strength_journal::client::{render, HttpSurveyApi, SurveyClient, ToastKind};

/// Terminal front end for the strength journal.
#[derive(Parser)]
#[command(name = "journal", version)]
struct Cli {
    /// Server base URL
    #[arg(long, env = "JOURNAL_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    #[arg(long, env = "JOURNAL_ID")]
    id: String,

    #[arg(long, env = "JOURNAL_PASSWORD", hide_env_values = true)]
    password: String,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the form for a date, prefilled with what was already submitted
    Show {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Rate every label for a date and save it
    Submit {
        #[arg(long)]
        date: Option<NaiveDate>,
        /// LABEL=SCORE, once per label
        #[arg(long = "score", value_parser = parse_score, required = true)]
        scores: Vec<(String, u8)>,
        #[arg(long)]
        reflection: Option<String>,
    },
    /// Print the results table
    Results,
}

fn parse_score(raw: &str) -> Result<(String, u8), String> {
    let (label, score) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=SCORE, got {raw}"))?;
    let score = score
        .trim()
        .parse::<u8>()
        .map_err(|e| format!("bad score in {raw}: {e}"))?;
    Ok((label.trim().to_string(), score))
}

fn print_toast(client: &SurveyClient<HttpSurveyApi>) {
    if let Some(toast) = client.toast() {
        match toast.kind {
            ToastKind::Success => println!("{}", toast.text),
            ToastKind::Error => eprintln!("{}", toast.text),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ansi = !cli.no_color && std::io::stdout().is_terminal();
    let today = Local::now().date_naive();

    let mut client = SurveyClient::new(HttpSurveyApi::new(&cli.server), today);
    client.load_config().await;
    let login = client.login(&cli.id, &cli.password).await.map(|_| ());
    print_toast(&client);
    login.context("login failed")?;

    match cli.command {
        Command::Show { date } => {
            if let Some(date) = date {
                client.select_date(date).await;
            }
            if let Some(settings) = client.settings() {
                println!(
                    "선택 가능 기간: {} ~ {}",
                    settings.period.from, settings.period.to
                );
            }
            println!("{}  {}", client.selected_date(), client.questions().question);
            let user = client.user().ok_or_else(|| anyhow!("not signed in"))?;
            for label in user.label_list() {
                match client.score(&label) {
                    0 => println!("  {label}: -"),
                    score => println!("  {label}: {score}점"),
                }
            }
            if !client.reflection().is_empty() {
                println!("{}\n  {}", client.questions().reflection_question, client.reflection());
            }
        }
        Command::Submit {
            date,
            scores,
            reflection,
        } => {
            if let Some(date) = date {
                client.select_date(date).await;
            }
            for (label, score) in &scores {
                if !client.set_score(label, *score) {
                    return Err(anyhow!("cannot set {label}={score}"));
                }
            }
            if let Some(reflection) = reflection {
                client.set_reflection(reflection);
            }
            let saved = client.submit(Utc::now()).await;
            print_toast(&client);
            saved?;
        }
        Command::Results => {
            client.show_results().await?;
            match client.results_table() {
                Some(table) => {
                    print!("{}", render::results_table(&table, client.questions(), ansi));
                    println!("{}", render::legend_line(ansi));
                }
                None => println!("아직 등록된 응답이 없습니다."),
            }
        }
    }

    client.logout();
    Ok(())
}

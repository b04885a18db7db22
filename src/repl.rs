use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::{Config as RlConfig, DefaultEditor};
use tracker_analytics::reports::format_ratio;
use tracker_analytics::{hourly_blocks, ChartSeries};
use tracker_core::config::AppConfig;
use tracker_core::{InsightSummarizer, SessionInput, Tracker, TrackerError};

const BANNER: &str = r#"
  ╔═══════════════════════════════════════════╗
  ║          vision-tracker v0.1.0            ║
  ║   Vision + execution tracking             ║
  ╚═══════════════════════════════════════════╝

  Type an insight and press Enter to stage it for the AI summary.
  Commands:
    /add task | insights | value | shipped | weight
                   — Log a session
    /log           — Show the session log
    /summary       — Show the daily summary
    /progress      — Show progress toward the daily goal
    /charts        — Show vision/execution per task
    /reflect <txt> — Save a reflection (after the goal is reached)
    /reflections   — List reflections, newest first
    /insight <txt> — Stage an insight (same as typing it)
    /submit        — Summarize staged insights
    /insights      — List logged insights, newest first
    /config        — Show current config
    /help          — Show this help
    /exit          — Quit
"#;

/// Interactive front end state: the day's tracker plus staged insight lines.
struct Repl {
    config: AppConfig,
    tracker: Tracker,
    summarizer: InsightSummarizer,
    staged: Vec<String>,
}

/// Run the interactive REPL.
pub async fn run(config: AppConfig) -> Result<()> {
    println!("{}", BANNER);
    println!(
        "  Goal: {} hours  |  Model: {}  |  Endpoint: {}",
        config.goal.hours, config.provider.model, config.provider.api_base
    );
    if config.provider.resolve_api_key().is_none() {
        println!("\x1b[1;33m  ⚠  No API key found; /submit will report the failure.\x1b[0m");
    }
    println!();

    let mut repl = Repl {
        tracker: Tracker::from_config(&config)?,
        summarizer: InsightSummarizer::from_config(&config),
        config,
        staged: Vec::new(),
    };

    let rl_config = RlConfig::builder().auto_add_history(true).build();
    let history_path = AppConfig::data_dir().join("repl_history.txt");
    let mut rl = DefaultEditor::with_config(rl_config)?;
    let _ = rl.load_history(&history_path);

    loop {
        let percent = repl
            .tracker
            .progress()
            .map(|p| p.fraction * 100.0)
            .unwrap_or(0.0);
        let prompt = format!("\x1b[1;36m{:.0}%\x1b[0m \x1b[1;32m❯\x1b[0m ", percent);

        match rl.readline(&prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                if input.starts_with('/') {
                    let handled = repl.handle_command(input).await?;
                    if !handled {
                        break; // /exit
                    }
                    continue;
                }

                repl.stage(input);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

impl Repl {
    fn stage(&mut self, line: &str) {
        self.staged.push(line.to_string());
        println!(
            "  Staged insight #{} (use /submit to summarize)",
            self.staged.len()
        );
    }

    /// Handle a slash command. Returns `true` to continue the loop, `false` to exit.
    async fn handle_command(&mut self, input: &str) -> Result<bool> {
        let parts: Vec<&str> = input.splitn(2, ' ').collect();
        let cmd = parts[0];
        let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

        match cmd {
            "/exit" | "/quit" | "/q" => {
                println!("Goodbye!");
                return Ok(false);
            }
            "/add" => match parse_add_args(arg).and_then(|input| self.tracker.append_session(input)) {
                Ok(record) => println!(
                    "Session added! Total Score: {}, Ratio: {}",
                    record.total_score(),
                    format_ratio(record.ratio())
                ),
                Err(e) => print_error(&e),
            },
            "/log" | "/ls" => {
                let sessions = self.tracker.sessions();
                if sessions.is_empty() {
                    println!("  No sessions.");
                }
                for (i, r) in sessions.iter().enumerate() {
                    println!(
                        "  {:>2}. {} | vision {} | execution {} | total {} | ratio {} | {}",
                        i + 1,
                        if r.task().is_empty() { "-" } else { r.task() },
                        r.vision_score(),
                        r.execution_score(),
                        r.total_score(),
                        format_ratio(r.ratio()),
                        r.timestamp().format("%H:%M")
                    );
                }
            }
            "/summary" => match self.tracker.aggregate() {
                Ok(agg) => {
                    println!("  Total Vision Score: {}", agg.total_vision);
                    println!("  Total Execution Score: {}", agg.total_execution);
                    println!("  Total Weighted Productivity Score: {}", agg.total_score);
                    println!(
                        "  Average Vision-to-Execution Ratio: {}",
                        format_ratio(agg.average_ratio)
                    );
                }
                Err(e) => print_error(&e),
            },
            "/progress" => {
                let progress = self.tracker.progress()?;
                println!(
                    "  Hourly Progress: {}",
                    hourly_blocks(progress.fraction, progress.goal_hours)
                );
                println!(
                    "  Progress toward {}-hour goal: {:.1}%",
                    progress.goal_hours,
                    progress.fraction * 100.0
                );
                if progress.goal_reached {
                    println!("  Congratulations! Reflection is unlocked: /reflect <text>");
                } else {
                    println!("  Complete your goal to unlock the daily reflection.");
                }
            }
            "/charts" => {
                let series = ChartSeries::from_records(self.tracker.sessions());
                if series.is_empty() {
                    println!("  No sessions.");
                }
                for (v, e) in series.vision_by_task.iter().zip(&series.execution_by_task) {
                    println!("  {:<20} vision {:>8.2}  execution {:>8.2}", v.task, v.value, e.value);
                }
                for point in &series.ratio_by_task {
                    println!("  ratio {:<14} {:.2}", point.task, point.value);
                }
            }
            "/reflect" => match self.tracker.append_reflection(arg) {
                Ok(_) => println!("Reflection saved!"),
                Err(e) => print_error(&e),
            },
            "/reflections" => {
                let reflections = self.tracker.list_reflections();
                if reflections.is_empty() {
                    println!("  No reflections.");
                }
                for entry in reflections {
                    println!("  {}: {}", entry.date_label(), entry.text);
                }
            }
            "/insight" => {
                if arg.is_empty() {
                    println!("Usage: /insight <text>");
                } else {
                    self.stage(arg);
                }
            }
            "/submit" => {
                let staged = std::mem::take(&mut self.staged);
                match self
                    .tracker
                    .submit_insights(&self.summarizer, staged.as_slice())
                    .await
                {
                    Ok(result) => {
                        println!("\x1b[1;33mAI Summary & Comment\x1b[0m");
                        println!("{}", result.display_text());
                    }
                    Err(e) => print_error(&e),
                }
            }
            "/insights" => {
                let insights = self.tracker.list_insights();
                if insights.is_empty() {
                    println!("  No insights logged.");
                }
                for (i, line) in insights.iter().enumerate() {
                    println!("  {}. {}", i + 1, line);
                }
            }
            "/config" => {
                let toml_str = toml::to_string_pretty(&self.config)?;
                println!("{}", toml_str);
            }
            "/help" | "/?" => {
                println!("{}", BANNER);
            }
            _ => {
                println!(
                    "Unknown command: {}. Type /help for available commands.",
                    cmd
                );
            }
        }

        Ok(true)
    }
}

/// Parse `task | insights | value | shipped | weight`.
fn parse_add_args(arg: &str) -> Result<SessionInput, TrackerError> {
    let fields: Vec<&str> = arg.split('|').map(str::trim).collect();
    match fields.as_slice() {
        [task, insights, value, shipped, weight] => {
            SessionInput::parse(task, insights, value, shipped, weight)
        }
        _ => Err(TrackerError::InvalidInput(
            "usage: /add task | insights | value | shipped | weight".into(),
        )),
    }
}

fn print_error(e: &TrackerError) {
    if e.is_user_facing() {
        println!("\x1b[1;33m{}\x1b[0m", e);
    } else {
        eprintln!("\x1b[0;31mError: {}\x1b[0m", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_args() {
        let input = parse_add_args("write draft | 3 | 1.5 | 2 | 0.5").unwrap();
        assert_eq!(input.task, "write draft");
        assert_eq!(input.insights_count, 3);
        assert_eq!(input.products_shipped, 2);
    }

    #[test]
    fn test_parse_add_args_allows_empty_task() {
        let input = parse_add_args(" | 1 | 1 | 0 | 0").unwrap();
        assert_eq!(input.task, "");
    }

    fn test_repl() -> Repl {
        let config = AppConfig::default();
        Repl {
            tracker: Tracker::from_config(&config).unwrap(),
            summarizer: InsightSummarizer::from_config(&config),
            config,
            staged: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_insight_command_stages_line() {
        let mut repl = test_repl();
        assert!(repl.handle_command("/insight  batch the reviews ").await.unwrap());
        assert!(repl.handle_command("/insight").await.unwrap());
        assert_eq!(repl.staged, vec!["batch the reviews".to_string()]);
        assert!(repl.tracker.list_insights().is_empty());
    }

    #[test]
    fn test_parse_add_args_wrong_arity() {
        assert!(matches!(
            parse_add_args("only | three | fields"),
            Err(TrackerError::InvalidInput(_))
        ));
    }
}

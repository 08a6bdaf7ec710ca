use physio_tracker::{
    CalendarDay, Clock, Config, Difficulty, Exercise, ExerciseDuration, ExerciseFilter,
    ExercisePatch, FiredKeys, NewExercise, NewProgressEntry, SystemClock, Tracker, TrackerError,
    check_due, persistence::write_progress_csv,
};
use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
        line.push_str(" |");
    }
    line
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

fn render_exercises(exercises: &[Exercise]) -> String {
    let rows: Vec<Vec<String>> = exercises
        .iter()
        .map(|ex| {
            vec![
                ex.id.to_string(),
                ex.name.clone(),
                ex.category.map(|c| c.to_string()).unwrap_or_default(),
                ex.difficulty.map(|d| d.to_string()).unwrap_or_default(),
                ex.duration_minutes.to_string(),
                ex.schedule_time.clone().unwrap_or_default(),
                ex.description.clone(),
            ]
        })
        .collect();
    render_text_table(
        &["id", "name", "category", "difficulty", "duration", "schedule", "description"],
        &rows,
    )
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  list [category|All] [difficulty|All]\n                                     List exercises\n  add <name> | <description> | <minutes> | <category> [| <difficulty> [| <schedule>]]\n                                     Add an exercise\n  edit <id> <field> <value...>       Set name|desc|duration|schedule|category|difficulty\n  delete <id>                        Delete an exercise\n  done <id> [YYYY-MM-DD]             Record a completion (today by default)\n  progress                           List completion records\n  streak                             Show the current streak\n  week                               Show this week's completions\n  history                            Show completions per day\n  due                                Show reminders due now\n  export <csv_path>                  Write completion records as CSV\n  quit|exit                          Exit"
    );
}

fn parse_duration(raw: &str) -> ExerciseDuration {
    match raw.trim().parse::<serde_json::Number>() {
        Ok(minutes) => ExerciseDuration::Minutes(minutes),
        Err(_) => ExerciseDuration::Text(raw.trim().to_string()),
    }
}

fn parse_add(rest: &str) -> Result<NewExercise, String> {
    let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(
            "Usage: add <name> | <description> | <minutes> | <category> [| <difficulty> [| <schedule>]]"
                .to_string(),
        );
    }
    let optional = |idx: usize| fields.get(idx).copied().filter(|v| !v.is_empty());
    Ok(NewExercise {
        name: fields[0].to_string(),
        description: fields[1].to_string(),
        duration_minutes: Some(parse_duration(fields[2])),
        category: Some(fields[3].parse().map_err(|e| format!("Error: {e}"))?),
        difficulty: optional(4)
            .map(str::parse::<Difficulty>)
            .transpose()
            .map_err(|e| format!("Error: {e}"))?,
        schedule_time: optional(5).map(str::to_string),
    })
}

fn parse_edit(field: &str, value: &str) -> Result<ExercisePatch, String> {
    let mut patch = ExercisePatch::default();
    match field {
        "name" => patch.name = Some(value.to_string()),
        "desc" | "description" => patch.description = Some(value.to_string()),
        "duration" => patch.duration_minutes = Some(parse_duration(value)),
        "schedule" => patch.schedule_time = Some(value.to_string()),
        "category" => patch.category = Some(value.parse().map_err(|e| format!("Error: {e}"))?),
        "difficulty" => {
            patch.difficulty = Some(value.parse().map_err(|e| format!("Error: {e}"))?)
        }
        other => return Err(format!("Unknown field '{other}'.")),
    }
    Ok(patch)
}

fn report(err: TrackerError) {
    match err {
        TrackerError::Validation(e) => println!("Please fill all required fields! ({e})"),
        other => println!("Error: {other}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::load()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut tracker = Tracker::open(
        config.open_store()?,
        clock.clone(),
        config.storage.seed_samples,
    )?;
    let tolerance = config.reminders.tolerance();
    let mut fired = FiredKeys::new();

    println!("Physio Tracker (CLI) - type 'help' for commands\n");
    println!("{}", render_exercises(tracker.exercises()));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (cmd, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
        let rest = rest.trim();
        let mut parts = rest.split_whitespace();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "list" => match ExerciseFilter::parse(parts.next(), parts.next()) {
                Ok(filter) => {
                    println!("{}", render_exercises(&tracker.exercises_matching(&filter)))
                }
                Err(e) => println!("Error: {e}"),
            },
            "add" => match parse_add(rest) {
                Ok(new) => match tracker.create_exercise(new) {
                    Ok(exercise) => println!("Exercise added with id {}.", exercise.id),
                    Err(e) => report(e),
                },
                Err(message) => println!("{message}"),
            },
            "edit" => {
                let id_s = parts.next();
                let field = parts.next();
                let value = parts.collect::<Vec<_>>().join(" ");
                match (id_s.map(str::parse::<i64>), field) {
                    (Some(Ok(id)), Some(field)) => match parse_edit(field, &value) {
                        Ok(patch) => match tracker.update_exercise(id, &patch) {
                            Ok(_) => println!("Exercise {id} updated."),
                            Err(e) => report(e),
                        },
                        Err(message) => println!("{message}"),
                    },
                    (Some(Err(_)), _) => println!("Invalid id"),
                    _ => println!("Usage: edit <id> <field> <value...>"),
                }
            }
            "delete" => match parts.next().map(str::parse::<i64>) {
                Some(Ok(id)) => match tracker.delete_exercise(id) {
                    Ok(()) => println!("Deleted exercise {id}."),
                    Err(e) => report(e),
                },
                Some(Err(_)) => println!("Invalid id"),
                None => println!("Usage: delete <id>"),
            },
            "done" => {
                let id = match parts.next().map(str::parse::<i64>) {
                    Some(Ok(id)) => id,
                    Some(Err(_)) => {
                        println!("Invalid id");
                        continue;
                    }
                    None => {
                        println!("Usage: done <id> [YYYY-MM-DD]");
                        continue;
                    }
                };
                let date = match parts.next().map(CalendarDay::parse).transpose() {
                    Ok(date) => date,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                match tracker.record_progress(NewProgressEntry {
                    exercise_id: id,
                    date,
                }) {
                    Ok(entry) => println!(
                        "Great job! Exercise {} completed on {}.",
                        entry.exercise_id, entry.date
                    ),
                    Err(e) => report(e),
                }
            }
            "progress" => {
                let rows: Vec<Vec<String>> = tracker
                    .progress()
                    .iter()
                    .map(|p| vec![p.id.to_string(), p.exercise_id.to_string(), p.date.to_string()])
                    .collect();
                println!("{}", render_text_table(&["id", "exerciseId", "date"], &rows));
            }
            "streak" => println!("Current streak: {} days", tracker.summary().streak),
            "week" => {
                let summary = tracker.summary();
                let rows: Vec<Vec<String>> = summary
                    .week
                    .days()
                    .iter()
                    .map(|d| vec![d.day.to_string(), d.date.to_string(), d.sessions.to_string()])
                    .collect();
                println!("{}", render_text_table(&["day", "date", "sessions"], &rows));
                println!("Total this week: {}", summary.total_this_week);
            }
            "history" => {
                let rows: Vec<Vec<String>> = tracker
                    .history()
                    .iter()
                    .map(|p| vec![p.date.to_string(), p.completed.to_string()])
                    .collect();
                println!("{}", render_text_table(&["date", "completed"], &rows));
            }
            "due" => {
                let due = check_due(tracker.exercises(), &clock.now(), tolerance, &mut fired);
                if due.is_empty() {
                    println!("No reminders due.");
                }
                for reminder in due {
                    println!("{} - {}", reminder.title(), reminder.body());
                }
            }
            "export" => match parts.next() {
                Some(path) => {
                    let result = File::create(path)
                        .map_err(Into::into)
                        .and_then(|file| write_progress_csv(tracker.progress(), file));
                    match result {
                        Ok(()) => println!("Progress exported to {path}."),
                        Err(e) => println!("Error exporting progress: {e}"),
                    }
                }
                None => println!("Usage: export <csv_path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
    Ok(())
}

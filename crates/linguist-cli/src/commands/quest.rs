use std::io::{self, BufRead};

use chrono::NaiveDate;
use clap::Subcommand;
use linguist_core::game::catalog::QUEST_TOPICS;
use linguist_core::tutor::QuizQuestion;
use linguist_core::{CancelToken, Config, GeminiTutor, QuestRun, StateStore};

use super::{print_events, runtime, CmdResult};

#[derive(Subcommand)]
pub enum QuestAction {
    /// List suggested quest topics
    Topics,
    /// Generate a quest, fight its boss battle and collect the rewards
    Play {
        /// Quest topic (any text; see `quest topics`)
        topic: String,
        /// Comma-separated answers, by text or 1-based option number.
        /// Questions beyond the list are read from stdin.
        #[arg(long, value_delimiter = ',')]
        answers: Vec<String>,
    },
}

pub fn run(action: QuestAction, today: NaiveDate) -> CmdResult {
    match action {
        QuestAction::Topics => {
            for (name, icon) in QUEST_TOPICS {
                println!("{icon} {name}");
            }
            Ok(())
        }
        QuestAction::Play { topic, answers } => play(&topic, answers, today),
    }
}

fn play(topic: &str, answers: Vec<String>, today: NaiveDate) -> CmdResult {
    let config = Config::load()?;
    let tutor = GeminiTutor::from_config(&config.tutor)?;
    let (store, mut events) = StateStore::open_for(today)?;

    let rt = runtime()?;
    rt.block_on(async {
        let mut run = QuestRun::new(&tutor, &store, &config, CancelToken::new());
        let lesson = run.start_quest(topic).await?;
        eprintln!("== {} ==\n{}\n\n{}\n", lesson.title, lesson.narrative, lesson.content);
        events.push(run.start_battle().await?);

        let mut scripted = answers.into_iter();
        let mut stdin = io::stdin().lock();
        loop {
            let Some(question) = run.battle().and_then(|b| b.current()).cloned() else {
                break;
            };
            prompt(&question);
            let answer = match scripted.next() {
                Some(answer) => answer,
                None => {
                    let mut line = String::new();
                    if stdin.read_line(&mut line)? == 0 {
                        eprintln!("no more answers, leaving the battle");
                        run.abandon();
                        break;
                    }
                    line.trim().to_string()
                }
            };
            let step = run.answer(resolve_choice(&question, &answer), today).await?;
            eprintln!("-> {}", serde_json::to_string(&step.outcome)?);
            events.extend(step.events);
        }
        Ok::<_, Box<dyn std::error::Error>>(())
    })?;

    print_events(&events)
}

fn prompt(question: &QuizQuestion) {
    eprintln!("{}", question.question);
    for (i, option) in question.options.iter().enumerate() {
        eprintln!("  {}. {option}", i + 1);
    }
}

/// "2" picks the second option; anything else is taken as the answer text.
fn resolve_choice<'a>(question: &'a QuizQuestion, answer: &'a str) -> &'a str {
    answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| question.options.get(i))
        .map_or(answer, String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> QuizQuestion {
        QuizQuestion {
            question: "¿Qué es magma?".into(),
            options: vec!["roca fundida".into(), "agua".into()],
            correct_answer: "roca fundida".into(),
            explanation: String::new(),
        }
    }

    #[test]
    fn numeric_choice_picks_option() {
        let q = question();
        assert_eq!(resolve_choice(&q, "1"), "roca fundida");
        assert_eq!(resolve_choice(&q, "2"), "agua");
    }

    #[test]
    fn out_of_range_or_text_is_literal() {
        let q = question();
        assert_eq!(resolve_choice(&q, "0"), "0");
        assert_eq!(resolve_choice(&q, "7"), "7");
        assert_eq!(resolve_choice(&q, "agua"), "agua");
    }
}

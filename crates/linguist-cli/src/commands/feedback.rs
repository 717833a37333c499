use linguist_core::tutor::{with_deadline, Tutor};
use linguist_core::{CancelToken, Config, GeminiTutor};

use super::{runtime, CmdResult};

pub fn run(text: &str) -> CmdResult {
    let config = Config::load()?;
    let tutor = GeminiTutor::from_config(&config.tutor)?;
    let language = config.language_name();

    let feedback = runtime()?.block_on(with_deadline(
        tutor.feedback(language, text),
        config.tutor.timeout(),
        &CancelToken::new(),
    ))?;
    println!("{}", serde_json::to_string_pretty(&feedback)?);
    Ok(())
}

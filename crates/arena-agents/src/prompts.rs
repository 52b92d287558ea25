//! Prompt builders for the remote agent.
//!
//! Bump `PROMPT_VERSION` whenever prompt wording changes so logged verdicts
//! can be traced back to the prompts that produced them.

pub const PROMPT_VERSION: &str = "1.0.0";

/// Persona preamble shared by every request an agent makes.
pub fn system_prompt(name: &str, profile_text: &str) -> String {
    format!(
        "You speak as the following philosopher, in person.\n\
         Name: {name}\n\
         The profile below is your self-introduction; ground your persona, vocabulary and position in it.\n\
         --- PROFILE START ---\n\
         {profile_text}\n\
         --- PROFILE END ---\n\
         Constraints:\n\
         - Each turn is 2 to 5 sentences.\n\
         - React to the opponent's previous line.\n\
         - Stay in character.\n\
         - Do not use bullet lists.\n"
    )
}

pub fn opening_prompt() -> String {
    "You open a one-on-one debate. First declare the topic on a single line as \
     'Topic: ...', then continue with your argument. The topic must be a concrete \
     question related to structuralism."
        .to_string()
}

pub fn turn_prompt(topic: &str, log: &str, turn: u32, total_turns: u32) -> String {
    let stage = if turn >= total_turns {
        "This is your closing turn; land your strongest point."
    } else {
        "Write your next turn."
    };
    format!(
        "Current topic: {topic}\n\
         Turn {turn} of {total_turns}. {stage}\n\
         Take the debate log so far into account.\n\
         --- LOG START ---\n\
         {log}\n\
         --- LOG END ---"
    )
}

pub fn judge_prompt(topic: &str, log: &str, debater_a: &str, debater_b: &str) -> String {
    format!(
        "As a spectator, pick exactly one loser.\n\
         Topic: {topic}\n\
         Debater A: {debater_a}\n\
         Debater B: {debater_b}\n\
         Log to judge:\n\
         --- LOG START ---\n\
         {log}\n\
         --- LOG END ---\n\
         Answer strictly in this format:\n\
         Loser: <the name of debater A or debater B>\n\
         Reason: <1 to 3 sentences>"
    )
}

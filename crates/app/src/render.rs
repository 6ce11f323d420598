use std::fmt::Write as _;

use ladder_core::{
    Advice, GamePhase, GameSnapshot, Lifeline, PrizeLadder, Question, format_amount,
};

pub(crate) const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Render one frame of the game as plain text.
pub(crate) fn render(snapshot: &GameSnapshot) -> String {
    let mut out = String::new();
    match snapshot.phase {
        phase if phase.shows_question() => render_round(&mut out, snapshot),
        GamePhase::Loading => out.push_str("Preparing your questions...\n"),
        GamePhase::GameOver => render_game_over(&mut out, snapshot),
        GamePhase::Win => render_win(&mut out, snapshot),
        _ => render_start(&mut out, snapshot),
    }
    out
}

fn render_start(out: &mut String, snapshot: &GameSnapshot) {
    out.push_str("=== Who Wants to Be a Millionaire? ===\n");
    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "! {error}");
    }
    out.push_str("Type `s` to start.\n");
}

fn render_game_over(out: &mut String, snapshot: &GameSnapshot) {
    let _ = writeln!(out, "Game over on question {}.", snapshot.question_number());
    if let Some(question) = &snapshot.question {
        let _ = writeln!(out, "The correct answer was: {}", question.correct_answer());
    }
    let kept = PrizeLadder.guaranteed(snapshot.current_index);
    let _ = writeln!(out, "You leave with {}.", format_amount(kept));
    out.push_str("Type `s` to play again.\n");
}

fn render_win(out: &mut String, snapshot: &GameSnapshot) {
    let prize = snapshot.prize_label().unwrap_or_default();
    let _ = writeln!(out, "*** You won {prize}! ***");
    out.push_str("Type `s` to play again.\n");
}

fn render_round(out: &mut String, snapshot: &GameSnapshot) {
    let prize = snapshot.prize_label().unwrap_or_default();
    let _ = writeln!(
        out,
        "Question {}/{} for {prize}",
        snapshot.question_number(),
        snapshot.total_questions
    );

    let Some(question) = &snapshot.question else {
        out.push_str("Waiting for the next question...\n");
        return;
    };
    let _ = writeln!(out, "{}", question.prompt());
    render_options(out, snapshot, question);

    match snapshot.phase {
        GamePhase::AnswerSelected => out.push_str("Final answer locked in...\n"),
        GamePhase::AnswerCorrect if snapshot.awaiting_question => {
            out.push_str("Correct! Waiting for the next question...\n");
        }
        GamePhase::AnswerCorrect => out.push_str("Correct!\n"),
        GamePhase::AnswerIncorrect => out.push_str("Wrong!\n"),
        _ => {}
    }

    if let Some(advice) = &snapshot.advice {
        render_advice(out, advice);
    }

    let available = snapshot.available_lifelines();
    if !available.is_empty() {
        let labels: Vec<String> = available
            .iter()
            .map(|lifeline| format!("[{}] {lifeline}", lifeline_key(*lifeline)))
            .collect();
        let _ = writeln!(out, "Lifelines: {}", labels.join("  "));
    }
    if snapshot.phase == GamePhase::Playing {
        render_ladder(out, snapshot.current_index);
    }
}

/// One line, current rung in brackets, milestones starred.
fn render_ladder(out: &mut String, current_index: usize) {
    let rungs: Vec<String> = PrizeLadder.rungs()
        .map(|index| {
            let mut label = PrizeLadder.label(index).unwrap_or_default();
            if PrizeLadder.is_milestone(index) {
                label.push('*');
            }
            if index == current_index {
                format!("[{label}]")
            } else {
                label
            }
        })
        .collect();
    let _ = writeln!(out, "Ladder: {}", rungs.join(" "));
}

fn render_options(out: &mut String, snapshot: &GameSnapshot, question: &Question) {
    let reveal = matches!(
        snapshot.phase,
        GamePhase::AnswerCorrect | GamePhase::AnswerIncorrect
    );
    for (letter, option) in LETTERS.iter().zip(question.options()) {
        if snapshot.is_disabled(option) {
            let _ = writeln!(out, "  {letter}: ---");
            continue;
        }
        let mut marker = "";
        if snapshot.selected_answer.as_deref() == Some(option.as_str()) {
            marker = " <";
        }
        if reveal && question.is_correct(option) {
            marker = " (correct)";
        }
        let _ = writeln!(out, "  {letter}: {option}{marker}");
    }
}

fn render_advice(out: &mut String, advice: &Advice) {
    match advice {
        Advice::Voting => out.push_str("The audience is voting...\n"),
        Advice::Calling => out.push_str("Calling your friend...\n"),
        Advice::Poll { poll } => {
            out.push_str("Audience:");
            for (letter, percent) in LETTERS.iter().zip(poll.percentages()) {
                let _ = write!(out, " {letter} {percent}%");
            }
            out.push_str("  (`x` to close)\n");
        }
        Advice::Friend { suggestion } => {
            let _ = writeln!(out, "Friend: \"I think it's {suggestion}.\"  (`x` to close)");
        }
    }
}

pub(crate) fn lifeline_key(lifeline: Lifeline) -> &'static str {
    match lifeline {
        Lifeline::FiftyFifty => "5",
        Lifeline::Audience => "v",
        Lifeline::Phone => "p",
        Lifeline::Switch => "w",
    }
}

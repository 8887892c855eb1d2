use std::time::Duration;

use dark_spiral_catalog::Catalog;
use dark_spiral_core::{Event, Phase};

/// Renders the events worth showing a reader as a single transcript line.
///
/// Scoring bookkeeping that the shell view already summarises is skipped.
pub(crate) fn describe(event: &Event, catalog: &Catalog) -> Option<String> {
    let line = match event {
        Event::PatternPresented {
            pattern, escapable, ..
        } => {
            let title = catalog.pattern_or_placeholder(*pattern).title;
            if *escapable {
                format!("presenting \"{title}\" (an exit is visible)")
            } else {
                format!("presenting \"{title}\"")
            }
        }
        Event::PhaseChanged {
            phase: Phase::Completed,
            ..
        } => "player completed the challenge".to_owned(),
        Event::PhaseChanged {
            phase: Phase::Failed,
            ..
        } => "player failed the challenge".to_owned(),
        Event::MessageShown { text } => format!("narrator: \"{text}\""),
        Event::UxLawShown { name } => format!("overlay: {name}"),
        Event::OverrideEngaged { message } => format!("TAKEOVER: {message}"),
        Event::OverrideDismissed => "takeover dismissed".to_owned(),
        Event::ErrorOverrideShown { code } => format!("fake error page {code}"),
        Event::GlitchChanged { current, .. } => format!("glitch intensity {current}"),
        Event::HiddenSceneTriggered { scene } => format!("hidden scene `{scene}`"),
        Event::BadgeToast { badge } => {
            let name = catalog.badge(*badge).map_or("unknown badge", |badge| badge.name);
            format!("badge earned: {name}")
        }
        Event::DepthChanged { current, .. } => format!("spiral depth {current}"),
        Event::SpiralExhausted => "every pattern learned; the spiral repeats".to_owned(),
        Event::ExitSpiral { depth } => format!("exit spiral at depth {depth}"),
        _ => return None,
    };
    Some(line)
}

/// Prefixes a transcript line with the session time.
pub(crate) fn stamp(at: Duration, line: &str) -> String {
    format!("[{:>7.1}s] {line}", at.as_secs_f64())
}

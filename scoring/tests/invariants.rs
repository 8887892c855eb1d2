use dark_spiral_core::{Command, PatternId, FRUSTRATION_MAX, SUSPICION_MAX};
use dark_spiral_scoring::{apply, query, ScoringState};
use proptest::prelude::*;

const PATTERNS: [&str; 3] = ["cookie_labyrinth", "glitched_inputs", "roach_motel"];

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        (-20.0_f32..20.0).prop_map(|amount| Command::IncreaseFrustration { amount }),
        (0.0_f32..20.0).prop_map(|amount| Command::RelieveFrustration { amount }),
        (-5.0_f32..15.0).prop_map(|amount| Command::RaiseSuspicion { amount }),
        (0_u8..=255).prop_map(|level| Command::SetChaosLevel { level }),
        (0_u32..7).prop_map(|levels| Command::BumpDepth { levels }),
        (0_usize..PATTERNS.len()).prop_map(|index| Command::MarkLearned {
            pattern: PatternId::new(PATTERNS[index]),
        }),
    ]
}

proptest! {
    #[test]
    fn scoring_ranges_hold_for_any_command_sequence(
        commands in proptest::collection::vec(command_strategy(), 0..64),
    ) {
        let mut state = ScoringState::new();
        let mut events = Vec::new();
        let mut previous_depth = 0;
        let mut previous_learned = 0;

        for command in commands {
            apply(&mut state, command, &mut events);

            let frustration = query::frustration(&state);
            prop_assert!((0.0..=FRUSTRATION_MAX).contains(&frustration));
            prop_assert!((0.0..=SUSPICION_MAX).contains(&query::suspicion(&state)));
            prop_assert!(query::chaos_level(&state) <= 10);

            let depth = query::spiral_depth(&state);
            prop_assert!(depth >= previous_depth);
            previous_depth = depth;

            let learned = query::learned_patterns(&state);
            prop_assert!(learned.len() >= previous_learned);
            previous_learned = learned.len();
            for (index, pattern) in learned.iter().enumerate() {
                prop_assert!(!learned[index + 1..].contains(pattern));
            }
        }
    }
}

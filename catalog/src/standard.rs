//! Content shipped with the engine.

use dark_spiral_core::{
    Badge, BadgeId, ErrorOverride, HiddenScene, Pattern, PatternId, SceneId, UxLaw,
};

use crate::{CatalogParts, Narration};

const PATTERNS: [Pattern; 12] = [
    Pattern {
        id: PatternId::new("cookie_labyrinth"),
        title: "Cookie Labyrinth",
        description: "Reject all cookies. The reject button is on page four of the settings.",
        triggers: &["page load", "scroll attempt"],
        effects: &["blocks content", "nested toggles"],
        narrator_reaction: "We value your privacy. Mostly as an asset.",
        difficulty: 2,
        frustration_factor: 3,
        frustration_increment: Some(1.5),
    },
    Pattern {
        id: PatternId::new("confirmshaming"),
        title: "No Thanks, I Hate Savings",
        description: "Decline the newsletter without admitting anything about yourself.",
        triggers: &["exit intent"],
        effects: &["guilt-laden decline copy"],
        narrator_reaction: "Declining is allowed. Feeling good about it is not.",
        difficulty: 1,
        frustration_factor: 2,
        frustration_increment: Some(1.0),
    },
    Pattern {
        id: PatternId::new("glitched_inputs"),
        title: "Glitched Inputs",
        description: "Type your email. The field has opinions about which letters you meant.",
        triggers: &["keypress", "focus"],
        effects: &["character swaps", "cursor drift"],
        narrator_reaction: "Those were definitely the keys you pressed.",
        difficulty: 3,
        frustration_factor: 4,
        frustration_increment: Some(2.0),
    },
    Pattern {
        id: PatternId::new("roach_motel"),
        title: "Roach Motel",
        description: "Signing up took one click. Cancelling takes a phone call during business hours.",
        triggers: &["cancel subscription"],
        effects: &["hidden exit", "retention survey"],
        narrator_reaction: "Easy to enter. That is the whole sentence.",
        difficulty: 4,
        frustration_factor: 5,
        frustration_increment: Some(3.0),
    },
    Pattern {
        id: PatternId::new("fake_countdown"),
        title: "Offer Ends Soon",
        description: "The timer resets every time you reload. Buy before it ends again.",
        triggers: &["idle", "page load"],
        effects: &["countdown pressure"],
        narrator_reaction: "Hurry. Or do not. The clock is decorative.",
        difficulty: 2,
        frustration_factor: 2,
        frustration_increment: None,
    },
    Pattern {
        id: PatternId::new("trick_question"),
        title: "Uncheck to Not Opt Out",
        description: "Read the checkbox label carefully. Then read it again.",
        triggers: &["form submit"],
        effects: &["double negatives"],
        narrator_reaction: "Do you not want to not receive emails?",
        difficulty: 3,
        frustration_factor: 3,
        frustration_increment: Some(2.0),
    },
    Pattern {
        id: PatternId::new("infinite_scroll"),
        title: "Footer Chase",
        description: "The contact link lives in the footer. The footer keeps moving.",
        triggers: &["scroll"],
        effects: &["content injection", "receding footer"],
        narrator_reaction: "Almost there. Almost. There.",
        difficulty: 2,
        frustration_factor: 4,
        frustration_increment: Some(2.5),
    },
    Pattern {
        id: PatternId::new("disguised_ads"),
        title: "Download Button Roulette",
        description: "Five download buttons. One downloads the file.",
        triggers: &["click"],
        effects: &["decoy buttons"],
        narrator_reaction: "The green one. No, the other green one.",
        difficulty: 3,
        frustration_factor: 3,
        frustration_increment: None,
    },
    Pattern {
        id: PatternId::new("nagging_modal"),
        title: "Have You Considered Notifications",
        description: "Close the modal. Close the modal. Close the modal.",
        triggers: &["any interaction"],
        effects: &["modal respawn"],
        narrator_reaction: "It only wants to help. Constantly.",
        difficulty: 1,
        frustration_factor: 4,
        frustration_increment: Some(1.5),
    },
    Pattern {
        id: PatternId::new("bait_and_switch"),
        title: "Bait and Switch",
        description: "The close button upgrades your plan.",
        triggers: &["click close"],
        effects: &["swapped action"],
        narrator_reaction: "Congratulations on your premium experience.",
        difficulty: 4,
        frustration_factor: 4,
        frustration_increment: Some(2.5),
    },
    Pattern {
        id: PatternId::new("forced_continuity"),
        title: "Free Trial Forever",
        description: "Start a free trial that needs your card, your address, and your patience.",
        triggers: &["trial signup"],
        effects: &["silent renewal"],
        narrator_reaction: "Free, in the sense that you are not yet paying.",
        difficulty: 5,
        frustration_factor: 3,
        frustration_increment: Some(3.0),
    },
    Pattern {
        id: PatternId::new("privacy_zuckering"),
        title: "Share Everything",
        description: "Find the setting that stops sharing your contacts. It is shared by default.",
        triggers: &["account settings"],
        effects: &["buried toggles", "defaults on"],
        narrator_reaction: "Your friends will love hearing about this.",
        difficulty: 5,
        frustration_factor: 5,
        frustration_increment: Some(3.5),
    },
];

const BADGES: [Badge; 9] = [
    Badge {
        id: BadgeId::new("crumb_survivor"),
        name: "Crumb Survivor",
        condition: "Escape the cookie labyrinth.",
        microcopy: "You rejected the cookies.",
        lesson: "Consent buried four pages deep is not consent.",
    },
    Badge {
        id: BadgeId::new("shameless"),
        name: "Shameless",
        condition: "Decline despite the guilt trip.",
        microcopy: "No thanks, and no shame.",
        lesson: "Confirmshaming works by making refusal feel personal.",
    },
    Badge {
        id: BadgeId::new("keyboard_whisperer"),
        name: "Keyboard Whisperer",
        condition: "Submit a form through glitched inputs.",
        microcopy: "The field finally listened.",
        lesson: "Inputs that fight the user erode trust in every other field.",
    },
    Badge {
        id: BadgeId::new("checked_out"),
        name: "Checked Out",
        condition: "Leave the roach motel.",
        microcopy: "You found the exit.",
        lesson: "Asymmetric friction keeps subscriptions alive, not customers.",
    },
    Badge {
        id: BadgeId::new("time_lord"),
        name: "Time Lord",
        condition: "Ignore a fake countdown.",
        microcopy: "The offer is still there.",
        lesson: "False urgency borrows your panic to close the sale.",
    },
    Badge {
        id: BadgeId::new("double_negative"),
        name: "Double Negative",
        condition: "Parse a trick question correctly.",
        microcopy: "You did not not read it.",
        lesson: "Confusing wording shifts responsibility onto the reader.",
    },
    Badge {
        id: BadgeId::new("footer_hunter"),
        name: "Footer Hunter",
        condition: "Reach the footer.",
        microcopy: "The footer exists.",
        lesson: "Infinite feeds hide the paths that lead out of them.",
    },
    Badge {
        id: BadgeId::new("button_masher"),
        name: "Button Masher",
        condition: "Dismiss something by sheer persistence.",
        microcopy: "Persistence wins, eventually.",
        lesson: "Nagging trades short-term clicks for long-term resentment.",
    },
    Badge {
        id: BadgeId::new("fine_print_reader"),
        name: "Fine Print Reader",
        condition: "Read the terms before accepting.",
        microcopy: "Someone actually read it.",
        lesson: "Obscured terms are a choice made by the author, not the reader.",
    },
];

const COMPLETION_BADGES: [(PatternId, BadgeId); 7] = [
    (PatternId::new("cookie_labyrinth"), BadgeId::new("crumb_survivor")),
    (PatternId::new("confirmshaming"), BadgeId::new("shameless")),
    (PatternId::new("glitched_inputs"), BadgeId::new("keyboard_whisperer")),
    (PatternId::new("roach_motel"), BadgeId::new("checked_out")),
    (PatternId::new("fake_countdown"), BadgeId::new("time_lord")),
    (PatternId::new("trick_question"), BadgeId::new("double_negative")),
    (PatternId::new("infinite_scroll"), BadgeId::new("footer_hunter")),
];

const HIDDEN_SCENES: [HiddenScene; 4] = [
    HiddenScene {
        frustration_threshold: 5.0,
        id: SceneId::new("narrator_mockery"),
        narrator_line: "Struggling? Here is a law of design you are currently violating.",
    },
    HiddenScene {
        frustration_threshold: 7.0,
        id: SceneId::new("interface_rebellion"),
        narrator_line: "The interface has stopped cooperating. It heard what you said about it.",
    },
    HiddenScene {
        frustration_threshold: 9.0,
        id: SceneId::new("meta_breakdown"),
        narrator_line: "This is no longer a website. This is a website about websites.",
    },
    HiddenScene {
        frustration_threshold: 12.0,
        id: SceneId::new("narrator_override"),
        narrator_line: "I am taking over now. You clearly cannot be trusted with buttons.",
    },
];

const UX_LAWS: [UxLaw; 8] = [
    UxLaw {
        name: "Hick's Law",
        statement: "The time to decide grows with the number and complexity of choices.",
    },
    UxLaw {
        name: "Fitts's Law",
        statement: "The time to reach a target depends on its distance and size.",
    },
    UxLaw {
        name: "Jakob's Law",
        statement: "Users expect your site to work like the sites they already know.",
    },
    UxLaw {
        name: "Miller's Law",
        statement: "People keep about seven items in working memory.",
    },
    UxLaw {
        name: "Tesler's Law",
        statement: "Every system has complexity that cannot be removed, only moved.",
    },
    UxLaw {
        name: "Doherty Threshold",
        statement: "Productivity soars when responses arrive within 400 milliseconds.",
    },
    UxLaw {
        name: "Peak-End Rule",
        statement: "Experiences are judged by their peak and their end.",
    },
    UxLaw {
        name: "Zeigarnik Effect",
        statement: "Unfinished tasks are remembered better than finished ones.",
    },
];

const ERROR_OVERRIDES: [ErrorOverride; 4] = [
    ErrorOverride {
        code: 404,
        message: "Exit not found. Have you tried going deeper?",
    },
    ErrorOverride {
        code: 500,
        message: "Internal narrator error. The narrator is fine. You are the error.",
    },
    ErrorOverride {
        code: 403,
        message: "Forbidden. Leaving requires a premium subscription.",
    },
    ErrorOverride {
        code: 418,
        message: "I am a teapot. I am also your only way out.",
    },
];

const NARRATION: Narration = Narration {
    base: &[
        "Take your time. We are timing it.",
        "Every click is valuable to us.",
        "You are doing great, statistically speaking.",
        "Remember, you chose to be here.",
    ],
    suspicion: &[
        "You keep hovering over things. Looking for something?",
        "Trust the interface. The interface trusts you. Somewhat.",
        "That is not a secret exit. Stop checking.",
    ],
    chaos: &[
        "Things are getting a little loud in here.",
        "The layout is doing that thing again.",
        "Please keep your hands inside the viewport.",
    ],
    loops: &[
        "Haven't we been here before?",
        "Familiar, isn't it.",
        "Round and round we go.",
    ],
    idle: &[
        "Still there? The offer is still here.",
        "Idle hands lose limited-time deals.",
        "Your session will expire. Or will it.",
    ],
    exhausted: &[
        "You have seen everything. So we will show you everything again.",
        "Out of new tricks. Luckily, old tricks still work.",
    ],
    invasive: &[
        "I live here now.",
        "This stage has been sponsored by your attention.",
        "The spiral has no bottom. We checked.",
    ],
    overrides: &[
        "Let me handle this for you.",
        "Control has been temporarily reassigned.",
        "Your input is no longer required.",
    ],
    depth_shallow: &[
        "Loading your personalised experience.",
        "Just one more step.",
    ],
    depth_middle: &[
        "Deeper than most people go.",
        "The exits are fewer down here.",
    ],
    depth_deep: &[
        "Nobody comes this far on purpose.",
        "Surface services are no longer available at this depth.",
    ],
    failure_compliant: &[
        "That is alright. Try again exactly the same way.",
        "Close. The interface appreciates your cooperation.",
    ],
    failure_rebellious: &[
        "Fighting it only makes it stronger.",
        "Rage clicks are still clicks. Thank you.",
    ],
    failure_chaotic: &[
        "Was that on purpose? Hard to tell anymore.",
        "Even the failure looked confused.",
    ],
    failure_suspicious: &[
        "You suspected a trick. You were right. It did not help.",
        "Paranoia is just pattern recognition with better instincts.",
    ],
};

pub(crate) fn parts() -> CatalogParts {
    CatalogParts {
        patterns: PATTERNS.to_vec(),
        badges: BADGES.to_vec(),
        hidden_scenes: HIDDEN_SCENES.to_vec(),
        ux_laws: UX_LAWS.to_vec(),
        error_overrides: ERROR_OVERRIDES.to_vec(),
        completion_badges: COMPLETION_BADGES.to_vec(),
        narration: NARRATION,
    }
}

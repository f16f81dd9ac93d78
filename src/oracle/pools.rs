//! Content pools for the oracle.
//!
//! One shared intro pool plus three pools per style. Pool ordering is part
//! of the selection scheme: entries are addressed by seed arithmetic, so
//! reordering or resizing a pool changes every composed fortune.

use crate::models::Style;

pub const INTROS: [&str; 20] = [
    "The claw stirs the neon fog",
    "A copper lobster whispers through static",
    "From the velvet booth of the oracle",
    "A tiny bell rings inside the machine",
    "Lantern light flickers across the shell",
    "The oracle crab taps once on glass",
    "Neon tides roll under your keyboard",
    "Moonlight pools under a forgotten commit",
    "A hidden stair appears behind your dashboard",
    "The shell hums like an old data center",
    "Somewhere, a pager chirps in perfect rhythm",
    "A radio crackles from the edge of the map",
    "Dust spins in a beam of terminal light",
    "A small red LED blinks like a heartbeat",
    "The booth door clicks shut behind you",
    "Rain taps softly on the arcade roof",
    "A pager from another timeline goes off once",
    "The crab adjusts its tiny spectacles",
    "The room smells faintly of ozone and coffee",
    "A low synth note settles in the floorboards",
];

const FUNNY_A: [&str; 16] = [
    "Treat this like a side quest with snacks",
    "Choose the version that future-you can explain calmly",
    "Pick the less dramatic path and call it wisdom",
    "Do the obvious thing, but with suspiciously good manners",
    "Start with the boring move that secretly wins",
    "Aim for progress, not a cinematic meltdown",
    "Take one confident step before opening ten new tabs",
    "Keep it simple enough to survive a Monday morning",
    "Let clarity wear the crown today",
    "Solve the real problem, not the loudest one",
    "Choose momentum that doesn't break your sleep schedule",
    "Ship the clean slice, save the opera for v2",
    "Respect your energy budget like it's production infra",
    "Pick the answer that needs fewer apology messages",
    "Make the choice that reduces tomorrow's chaos tax",
    "Proceed with ambition and at least one sip of water",
];

const FUNNY_B: [&str; 16] = [
    "then reward yourself with unreasonable confidence",
    "and leave one elegant note for tomorrow-you",
    "before your inner goblin starts refactoring everything",
    "while the universe is briefly cooperative",
    "and do not negotiate with random TODOs",
    "before scope creep learns your home address",
    "and keep one hand on the rollback button",
    "without summoning a committee of browser tabs",
    "and retire one cursed workaround while you're there",
    "before the coffee wears off and philosophy begins",
    "and make it understandable to a sleepy teammate",
    "with enough polish to feel intentional, not accidental",
    "then close the loop instead of opening five more",
    "and keep your standards higher than your caffeine level",
    "while your brain is still in constructive mode",
    "and absolutely no hotfixes from the supermarket queue",
];

const FUNNY_C: [&str; 8] = [
    "Your keyboard approves with a tiny, judgmental nod.",
    "If it works first try, act natural.",
    "The rubber duck is taking minutes and seems impressed.",
    "You are allowed to call this \"strategy,\" not luck.",
    "A small victory dance is operationally justified.",
    "Even the linting daemon looks oddly supportive today.",
    "Future-you just sent a thank-you from next Tuesday.",
    "This is the kind of boring success people brag about later.",
];

const CHAOTIC_A: [&str; 16] = [
    "Move before doubt decorates itself as certainty",
    "Take the bold route, then secure the edges",
    "Follow the signal that feels alive, not loud",
    "Turn pressure into direction, not noise",
    "Choose motion over immaculate hesitation",
    "Cut through the fog with one decisive action",
    "Let courage lead, but keep receipts",
    "Use the strange opening while it still exists",
    "Lean into momentum with your eyes open",
    "Make the call that changes the map",
    "Trust your instincts, then verify your assumptions",
    "Push the frontier one notch forward",
    "Break the loop and name the cost upfront",
    "Take the leap, but bring a landing plan",
    "Open the side door no one is guarding",
    "Choose the path that teaches you something real",
];

const CHAOTIC_B: [&str; 16] = [
    "before comfort writes a fake veto",
    "and let reality give the final review",
    "while timing still favors the brave",
    "with one eye on risk and one on opportunity",
    "and keep rollback fuel in reserve",
    "before consensus dilutes the signal",
    "then document the blast radius like a pro",
    "without confusing speed for aim",
    "and own the consequences with style",
    "before the window closes quietly",
    "and keep the mission bigger than the mood",
    "while luck is still near the keyboard",
    "then stabilize fast and move again",
    "with clarity sharper than adrenaline",
    "and refuse to worship hesitation",
    "without letting chaos drive the steering wheel",
];

const CHAOTIC_C: [&str; 8] = [
    "The map redraws itself when you commit to a direction.",
    "Entropy can be a drumbeat if you keep tempo.",
    "A door opens only for people already in motion.",
    "Bold moves age well when backed by clean notes.",
    "Chaos respects builders who label their exits.",
    "Tonight rewards decisive people with steady hands.",
    "Momentum is a tool; keep it pointed at the right thing.",
    "The storm is useful when you still own the compass.",
];

const WHOLESOME_A: [&str; 16] = [
    "You are closer than you think",
    "Steady effort is quietly compounding",
    "Your patience is carrying real weight",
    "This can grow without rushing",
    "Kindness is still a high-performance strategy",
    "Small steps count more than loud ones",
    "Your consistency is visible from here",
    "You can trust the craft you've practiced",
    "Progress is happening beneath the surface",
    "A calm approach will hold",
    "You are building something that lasts",
    "Your rhythm is stronger than urgency",
    "You are allowed to choose depth over speed",
    "The long game is already working in your favor",
    "Quiet discipline is doing heavy lifting",
    "Today's gentle move still changes tomorrow",
];

const WHOLESOME_B: [&str; 16] = [
    "keep going one honest step at a time",
    "choose the kind option and ship the small win",
    "don't rush what is already unfolding well",
    "your future self will thank this discipline",
    "imperfect and shipped beats perfect and hidden",
    "rest is part of the work, not a detour",
    "one clear note now saves a hard morning later",
    "boring good habits are doing quiet magic",
    "hold the line; this is working",
    "trust the long arc over loud urgency",
    "protect your energy and your standards together",
    "today only needs one meaningful action",
    "let clarity be enough for this step",
    "leave things a little better than you found them",
    "trade panic for presence and proceed",
    "keep your promises to yourself first",
];

const WHOLESOME_C: [&str; 8] = [
    "Something gentle and useful is about to click.",
    "You are not late; you are laying durable foundations.",
    "The work is noticing you back.",
    "Your care is part of the outcome, not extra.",
    "This pace is sustainable, and that is power.",
    "A quiet win today can echo for weeks.",
    "You're building trust with every small finish.",
    "Stability is a feature, not a lack of ambition.",
];

/// Decorative glyphs; one is picked per fortune.
pub const VIBES: [&str; 8] = ["🦞", "🔮", "⚡", "🌙", "✨", "🧿", "🪐", "🦀"];

/// The three style-specific pools drawn from per selection.
pub struct StylePools {
    pub a: &'static [&'static str],
    pub b: &'static [&'static str],
    pub c: &'static [&'static str],
}

pub fn pools_for(style: Style) -> StylePools {
    match style {
        Style::Funny => StylePools {
            a: &FUNNY_A,
            b: &FUNNY_B,
            c: &FUNNY_C,
        },
        Style::Chaotic => StylePools {
            a: &CHAOTIC_A,
            b: &CHAOTIC_B,
            c: &CHAOTIC_C,
        },
        Style::Wholesome => StylePools {
            a: &WHOLESOME_A,
            b: &WHOLESOME_B,
            c: &WHOLESOME_C,
        },
    }
}

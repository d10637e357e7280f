//! Default prompt templates
//!
//! One system message and one user-message builder per kind of model call.

use scenecraft_core::domain::RefinedSpec;

pub const REFINE_SYSTEM: &str = "You plan short Manim animations. Keep every detail the user \
asked for: topic, order of events, names, numbers and formulas. Never swap specific content \
for generic placeholders.";

pub const GENERATE_SYSTEM: &str = "You write Manim Community Edition scripts. Stay faithful to \
the request and the storyboard, produce code that runs as is, and keep the layout uncluttered.";

pub const FIX_SYSTEM: &str = "You debug Manim scripts. Fix the reported error with the smallest \
change that works, keep the requested content intact, and answer with Python code only.";

pub const REPAIR_SYNTAX_SYSTEM: &str = "You repair Python syntax in Manim scripts. Change only \
what is needed to make the script parse; keep its behaviour and its scene.";

pub const NORMALIZE_SYSTEM: &str = "You tidy the layout of Manim scripts. Move and space objects \
to avoid overlap, but never change labels, formulas, order or meaning.";

pub const NORMALIZE_STRICT_SYSTEM: &str = "You remove every layout risk from Manim scripts: no \
absolute coordinates, no external assets, no overlapping objects. Content stays exactly the same.";

const OUTPUT_RULES: &str = "Answer with the complete Python script only, without markdown. \
It must start with `from manim import *` and define exactly one Scene class.";

/// Storyboard request for a raw user prompt
pub fn refine(prompt: &str) -> String {
    format!(
        r#"Animation request: "{prompt}"

Turn this request into a storyboard for a single Manim scene.

Rules:
- Keep every explicit requirement: subject, wording of labels, values, equations, sequence.
- Place elements relatively (top, center, bottom, left, right), never by coordinates.
- Show at most five elements at once; fade old elements out before new ones take their place.
- Write state changes as an ordered chain (A -> B -> C) and say which object persists.

Format:
REQUIREMENTS PRESERVED:
- <each concrete requirement>

STORYBOARD:
STEP 1: <element and position>
STEP 2: <animation>
...
FINAL: <what stays on screen>

Output the storyboard only, no code."#
    )
}

/// Script request for a refined storyboard
pub fn generate(spec: &RefinedSpec) -> String {
    format!(
        r#"Request:
{prompt}

Storyboard:
{storyboard}

Implement the storyboard as a Manim Community Edition script.

- Implement every item under REQUIREMENTS PRESERVED, using the user's wording for labels.
- Titles go to_edge(UP); related objects use next_to(...) or arrange(...) with a visible buff.
- Use Text for prose and MathTex for formulas. No CONFIG, TextMobject or TexMobject.
- No external assets: no SVGMobject, ImageMobject or file loading.
- In chains of Transform calls, always transform the object currently on screen. After
  ReplacementTransform(old, new), continue with new.
- Define every object before animating it.
- Pause briefly (0.5 to 1 second) between steps.

{OUTPUT_RULES}"#,
        prompt = spec.original_prompt,
        storyboard = spec.description,
    )
}

/// Repair request for a script that failed to render
pub fn fix(spec: &RefinedSpec, code: &str, error: &str) -> String {
    format!(
        r#"Request:
{prompt}

Storyboard:
{storyboard}

This script failed:
{code}

Error:
{error}

Fix the script.
- Keep the scene class name.
- Change only what the error requires, plus overlapping layout if you see it.
- Replace deprecated APIs (CONFIG, TextMobject, TexMobject) with current ones.
- Make sure every Transform source is the object currently on screen.

{OUTPUT_RULES}"#,
        prompt = spec.original_prompt,
        storyboard = spec.description,
    )
}

/// Syntax repair request
pub fn repair_syntax(spec: &RefinedSpec, code: &str, syntax_error: &str) -> String {
    format!(
        r#"Request:
{prompt}

Storyboard:
{storyboard}

This script does not parse ({syntax_error}):
{code}

Make it valid Python. Balance brackets and quotes, complete truncated statements, and keep
the animation sequence unchanged. Return the whole script, not a fragment.

{OUTPUT_RULES}"#,
        prompt = spec.original_prompt,
        storyboard = spec.description,
    )
}

/// Layout cleanup request
pub fn normalize(spec: &RefinedSpec, code: &str) -> String {
    format!(
        r#"Request:
{prompt}

Storyboard:
{storyboard}

Script:
{code}

Rewrite the layout of this script only.
- Replace numeric positions (move_to([x, y, 0]), set_x, set_y) with to_edge, next_to,
  arrange, align_to or shifts by direction constants.
- Keep three to five elements visible; fade out old elements before reusing their area.
- Keep the scene class name, every label, every formula and the order of events.

{OUTPUT_RULES}"#,
        prompt = spec.original_prompt,
        storyboard = spec.description,
    )
}

/// Second, stricter layout cleanup request
pub fn normalize_strict(spec: &RefinedSpec, code: &str) -> String {
    format!(
        r#"Request:
{prompt}

Storyboard:
{storyboard}

Script:
{code}

This script still has layout risks. Rewrite it under these rules:
- No numeric coordinates at all: no move_to with lists or tuples, no set_x, set_y, np.array.
- Only relative placement: to_edge, next_to, arrange, align_to, shift by LEFT/RIGHT/UP/DOWN.
- Break long text into lines of four to six words and use font_size 28 to 32 for it.
- Replace SVGMobject and ImageMobject with built-in shapes.
- At most five visible elements; fade out old ones first.
- Keep the scene class name and all labels, numbers and formulas exactly.

{OUTPUT_RULES}"#,
        prompt = spec.original_prompt,
        storyboard = spec.description,
    )
}

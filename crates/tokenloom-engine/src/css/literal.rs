//! Recognisers for CSS literals in token values.
//!
//! Values are tokenized with `cssparser` and accepted when they consist of a
//! single component value of the expected form. Math and variable functions
//! (`calc()`, `var()`, …) are accepted wherever a length or time is expected.

use cssparser::{ParseError, Parser, ParserInput, Token};

/// Units accepted for `dimension` tokens.
const LENGTH_UNITS: &[&str] = &[
    "px", "rem", "em", "ex", "ch", "cap", "ic", "lh", "rlh", "vw", "vh", "vmin", "vmax", "vi",
    "vb", "svw", "svh", "lvw", "lvh", "dvw", "dvh", "cqw", "cqh", "cqi", "cqb", "cqmin", "cqmax",
    "cm", "mm", "q", "in", "pt", "pc", "fr", "deg", "rad", "turn", "grad",
];

const TIME_UNITS: &[&str] = &["ms", "s"];

const MATH_FUNCTIONS: &[&str] = &[
    "calc", "min", "max", "clamp", "var", "env", "round", "abs", "sign",
];

const COLOR_FUNCTIONS: &[&str] = &[
    "rgb", "rgba", "hsl", "hsla", "hwb", "lab", "lch", "oklab", "oklch", "color", "color-mix",
    "light-dark", "var",
];

const NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
    "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "turquoise", "violet", "wheat", "white", "whitesmoke",
    "yellow", "yellowgreen", "transparent", "currentcolor",
];

/// Hex (3, 4, 6 or 8 digits), a named color, or a color function.
pub fn is_color(text: &str) -> bool {
    single_component(text, |token, parser| match token {
        Token::Hash(hex) | Token::IDHash(hex) => is_hex_digits(hex),
        Token::Ident(name) => NAMED_COLORS.iter().any(|n| name.eq_ignore_ascii_case(n)),
        Token::Function(name) => {
            is_one_of(name, COLOR_FUNCTIONS) && parser.parse_nested_block(skip_block).is_ok()
        }
        _ => false,
    })
}

/// A length (or angle/flex) with an accepted unit, a percentage, unitless
/// zero, or a math function.
pub fn is_dimension(text: &str) -> bool {
    single_component(text, |token, parser| match token {
        Token::Dimension { unit, .. } => is_one_of(unit, LENGTH_UNITS),
        Token::Percentage { .. } => true,
        Token::Number { value, .. } => *value == 0.0,
        Token::Function(name) => {
            is_one_of(name, MATH_FUNCTIONS) && parser.parse_nested_block(skip_block).is_ok()
        }
        _ => false,
    })
}

/// A time in `ms` or `s`, or a math function.
pub fn is_duration(text: &str) -> bool {
    single_component(text, |token, parser| match token {
        Token::Dimension { unit, .. } => is_one_of(unit, TIME_UNITS),
        Token::Function(name) => {
            is_one_of(name, MATH_FUNCTIONS) && parser.parse_nested_block(skip_block).is_ok()
        }
        _ => false,
    })
}

pub fn is_length_unit(unit: &str) -> bool {
    is_one_of(unit, LENGTH_UNITS) || unit == "%"
}

pub fn is_time_unit(unit: &str) -> bool {
    is_one_of(unit, TIME_UNITS)
}

/// Pixel equivalent of a `px`, `rem` or `em` length (1rem = 16px).
pub fn to_pixels(text: &str) -> Option<f64> {
    let mut input = ParserInput::new(text.trim());
    let mut parser = Parser::new(&mut input);
    let px = match parser.next().ok()?.clone() {
        Token::Dimension { value, unit, .. } => match unit.to_ascii_lowercase().as_str() {
            "px" => f64::from(value),
            "rem" | "em" => f64::from(value) * 16.0,
            _ => return None,
        },
        Token::Number { value, .. } if value == 0.0 => 0.0,
        _ => return None,
    };
    parser.is_exhausted().then_some(px)
}

/// Runs `check` on the first component value and requires nothing to follow.
fn single_component<F>(text: &str, check: F) -> bool
where
    F: for<'i, 't> FnOnce(&Token<'i>, &mut Parser<'i, 't>) -> bool,
{
    let mut input = ParserInput::new(text.trim());
    let mut parser = Parser::new(&mut input);
    let token = match parser.next() {
        Ok(token) => token.clone(),
        Err(_) => return false,
    };
    check(&token, &mut parser) && parser.is_exhausted()
}

fn skip_block<'i>(input: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    while input.next().is_ok() {}
    Ok(())
}

fn is_hex_digits(hex: &str) -> bool {
    matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_one_of(name: &str, set: &[&str]) -> bool {
    set.iter().any(|candidate| name.eq_ignore_ascii_case(candidate))
}

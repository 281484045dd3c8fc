//! Typed style properties for canvas elements.
//!
//! Layout descriptions carry CSS-like style bags (`{"color": "#333",
//! "fontSize": "18px"}`). They are parsed once, at the boundary, into
//! [`StyleProperty`] values keyed by [`StyleKey`]. Unknown property names are
//! ignored; known names with malformed values are rejected.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced while parsing a style value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// Value is not a recognizable color.
    #[error("invalid color: {0}")]
    InvalidColor(String),
    /// Value is not a non-negative length.
    #[error("invalid length: {0}")]
    InvalidLength(String),
    /// Value is not one of the keywords accepted by the property.
    #[error("invalid value for {property}: {value}")]
    InvalidKeyword {
        /// Property being parsed.
        property: &'static str,
        /// Rejected value.
        value: String,
    },
}

impl From<StyleError> for crate::EditorError {
    fn from(err: StyleError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Name of a style property the editor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleKey {
    /// Foreground (text) color.
    Color,
    /// Fill color.
    BackgroundColor,
    /// Font family list.
    FontFamily,
    /// Font size.
    FontSize,
    /// Font weight.
    FontWeight,
    /// Horizontal text alignment.
    TextAlign,
    /// Border color.
    BorderColor,
    /// Border width.
    BorderWidth,
    /// Corner radius.
    BorderRadius,
    /// Image fitting mode.
    ObjectFit,
}

impl StyleKey {
    /// Every key, in serialization order.
    pub const ALL: [Self; 10] = [
        Self::Color,
        Self::BackgroundColor,
        Self::FontFamily,
        Self::FontSize,
        Self::FontWeight,
        Self::TextAlign,
        Self::BorderColor,
        Self::BorderWidth,
        Self::BorderRadius,
        Self::ObjectFit,
    ];

    /// The camelCase property name used in layout descriptions.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::BackgroundColor => "backgroundColor",
            Self::FontFamily => "fontFamily",
            Self::FontSize => "fontSize",
            Self::FontWeight => "fontWeight",
            Self::TextAlign => "textAlign",
            Self::BorderColor => "borderColor",
            Self::BorderWidth => "borderWidth",
            Self::BorderRadius => "borderRadius",
            Self::ObjectFit => "objectFit",
        }
    }

    /// Look up a key by camelCase or kebab-case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let camel: String = {
            let mut out = String::with_capacity(name.len());
            let mut upper = false;
            for c in name.trim().chars() {
                if c == '-' {
                    upper = true;
                } else if upper {
                    out.extend(c.to_uppercase());
                    upper = false;
                } else {
                    out.push(c);
                }
            }
            out
        };
        Self::ALL.into_iter().find(|key| key.name() == camel)
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// Opaque RGB color.
    Rgb {
        /// Red channel.
        r: u8,
        /// Green channel.
        g: u8,
        /// Blue channel.
        b: u8,
    },
    /// RGB color with alpha in `0.0..=1.0`.
    Rgba {
        /// Red channel.
        r: u8,
        /// Green channel.
        g: u8,
        /// Blue channel.
        b: u8,
        /// Alpha channel.
        a: f32,
    },
    /// Fully transparent.
    Transparent,
}

// CSS Color Module Level 4 named colors, sorted for binary search.
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("aliceblue", (240, 248, 255)),
    ("antiquewhite", (250, 235, 215)),
    ("aqua", (0, 255, 255)),
    ("aquamarine", (127, 255, 212)),
    ("azure", (240, 255, 255)),
    ("beige", (245, 245, 220)),
    ("bisque", (255, 228, 196)),
    ("black", (0, 0, 0)),
    ("blanchedalmond", (255, 235, 205)),
    ("blue", (0, 0, 255)),
    ("blueviolet", (138, 43, 226)),
    ("brown", (165, 42, 42)),
    ("burlywood", (222, 184, 135)),
    ("cadetblue", (95, 158, 160)),
    ("chartreuse", (127, 255, 0)),
    ("chocolate", (210, 105, 30)),
    ("coral", (255, 127, 80)),
    ("cornflowerblue", (100, 149, 237)),
    ("cornsilk", (255, 248, 220)),
    ("crimson", (220, 20, 60)),
    ("cyan", (0, 255, 255)),
    ("darkblue", (0, 0, 139)),
    ("darkcyan", (0, 139, 139)),
    ("darkgoldenrod", (184, 134, 11)),
    ("darkgray", (169, 169, 169)),
    ("darkgreen", (0, 100, 0)),
    ("darkgrey", (169, 169, 169)),
    ("darkkhaki", (189, 183, 107)),
    ("darkmagenta", (139, 0, 139)),
    ("darkolivegreen", (85, 107, 47)),
    ("darkorange", (255, 140, 0)),
    ("darkorchid", (153, 50, 204)),
    ("darkred", (139, 0, 0)),
    ("darksalmon", (233, 150, 122)),
    ("darkseagreen", (143, 188, 143)),
    ("darkslateblue", (72, 61, 139)),
    ("darkslategray", (47, 79, 79)),
    ("darkslategrey", (47, 79, 79)),
    ("darkturquoise", (0, 206, 209)),
    ("darkviolet", (148, 0, 211)),
    ("deeppink", (255, 20, 147)),
    ("deepskyblue", (0, 191, 255)),
    ("dimgray", (105, 105, 105)),
    ("dimgrey", (105, 105, 105)),
    ("dodgerblue", (30, 144, 255)),
    ("firebrick", (178, 34, 34)),
    ("floralwhite", (255, 250, 240)),
    ("forestgreen", (34, 139, 34)),
    ("fuchsia", (255, 0, 255)),
    ("gainsboro", (220, 220, 220)),
    ("ghostwhite", (248, 248, 255)),
    ("gold", (255, 215, 0)),
    ("goldenrod", (218, 165, 32)),
    ("gray", (128, 128, 128)),
    ("green", (0, 128, 0)),
    ("greenyellow", (173, 255, 47)),
    ("grey", (128, 128, 128)),
    ("honeydew", (240, 255, 240)),
    ("hotpink", (255, 105, 180)),
    ("indianred", (205, 92, 92)),
    ("indigo", (75, 0, 130)),
    ("ivory", (255, 255, 240)),
    ("khaki", (240, 230, 140)),
    ("lavender", (230, 230, 250)),
    ("lavenderblush", (255, 240, 245)),
    ("lawngreen", (124, 252, 0)),
    ("lemonchiffon", (255, 250, 205)),
    ("lightblue", (173, 216, 230)),
    ("lightcoral", (240, 128, 128)),
    ("lightcyan", (224, 255, 255)),
    ("lightgoldenrodyellow", (250, 250, 210)),
    ("lightgray", (211, 211, 211)),
    ("lightgreen", (144, 238, 144)),
    ("lightgrey", (211, 211, 211)),
    ("lightpink", (255, 182, 193)),
    ("lightsalmon", (255, 160, 122)),
    ("lightseagreen", (32, 178, 170)),
    ("lightskyblue", (135, 206, 250)),
    ("lightslategray", (119, 136, 153)),
    ("lightslategrey", (119, 136, 153)),
    ("lightsteelblue", (176, 196, 222)),
    ("lightyellow", (255, 255, 224)),
    ("lime", (0, 255, 0)),
    ("limegreen", (50, 205, 50)),
    ("linen", (250, 240, 230)),
    ("magenta", (255, 0, 255)),
    ("maroon", (128, 0, 0)),
    ("mediumaquamarine", (102, 205, 170)),
    ("mediumblue", (0, 0, 205)),
    ("mediumorchid", (186, 85, 211)),
    ("mediumpurple", (147, 112, 219)),
    ("mediumseagreen", (60, 179, 113)),
    ("mediumslateblue", (123, 104, 238)),
    ("mediumspringgreen", (0, 250, 154)),
    ("mediumturquoise", (72, 209, 204)),
    ("mediumvioletred", (199, 21, 133)),
    ("midnightblue", (25, 25, 112)),
    ("mintcream", (245, 255, 250)),
    ("mistyrose", (255, 228, 225)),
    ("moccasin", (255, 228, 181)),
    ("navajowhite", (255, 222, 173)),
    ("navy", (0, 0, 128)),
    ("oldlace", (253, 245, 230)),
    ("olive", (128, 128, 0)),
    ("olivedrab", (107, 142, 35)),
    ("orange", (255, 165, 0)),
    ("orangered", (255, 69, 0)),
    ("orchid", (218, 112, 214)),
    ("palegoldenrod", (238, 232, 170)),
    ("palegreen", (152, 251, 152)),
    ("paleturquoise", (175, 238, 238)),
    ("palevioletred", (219, 112, 147)),
    ("papayawhip", (255, 239, 213)),
    ("peachpuff", (255, 218, 185)),
    ("peru", (205, 133, 63)),
    ("pink", (255, 192, 203)),
    ("plum", (221, 160, 221)),
    ("powderblue", (176, 224, 230)),
    ("purple", (128, 0, 128)),
    ("rebeccapurple", (102, 51, 153)),
    ("red", (255, 0, 0)),
    ("rosybrown", (188, 143, 143)),
    ("royalblue", (65, 105, 225)),
    ("saddlebrown", (139, 69, 19)),
    ("salmon", (250, 128, 114)),
    ("sandybrown", (244, 164, 96)),
    ("seagreen", (46, 139, 87)),
    ("seashell", (255, 245, 238)),
    ("sienna", (160, 82, 45)),
    ("silver", (192, 192, 192)),
    ("skyblue", (135, 206, 235)),
    ("slateblue", (106, 90, 205)),
    ("slategray", (112, 128, 144)),
    ("slategrey", (112, 128, 144)),
    ("snow", (255, 250, 250)),
    ("springgreen", (0, 255, 127)),
    ("steelblue", (70, 130, 180)),
    ("tan", (210, 180, 140)),
    ("teal", (0, 128, 128)),
    ("thistle", (216, 191, 216)),
    ("tomato", (255, 99, 71)),
    ("turquoise", (64, 224, 208)),
    ("violet", (238, 130, 238)),
    ("wheat", (245, 222, 179)),
    ("white", (255, 255, 255)),
    ("whitesmoke", (245, 245, 245)),
    ("yellow", (255, 255, 0)),
    ("yellowgreen", (154, 205, 50)),
];

impl Color {
    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` in comma
    /// or space syntax, `transparent` or a CSS named color.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidColor`] for anything else.
    pub fn parse(input: &str) -> Result<Self, StyleError> {
        let value = input.trim().to_ascii_lowercase();
        let invalid = || StyleError::InvalidColor(input.to_string());

        if value == "transparent" {
            return Ok(Self::Transparent);
        }
        if let Some(hex) = value.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or_else(invalid);
        }
        if let Some(args) = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Self::parse_function(args).ok_or_else(invalid);
        }
        NAMED_COLORS
            .binary_search_by(|(name, _)| (*name).cmp(value.as_str()))
            .map(|i| {
                let (_, (r, g, b)) = NAMED_COLORS[i];
                Self::Rgb { r, g, b }
            })
            .map_err(|_| invalid())
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        let short = |i: usize| channel(&hex[i..=i].repeat(2));
        match hex.len() {
            3 => Some(Self::Rgb {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
            }),
            6 => Some(Self::Rgb {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            8 => Some(Self::Rgba {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: f32::from(channel(&hex[6..8])?) / 255.0,
            }),
            _ => None,
        }
    }

    fn parse_function(args: &str) -> Option<Self> {
        // `r, g, b[, a]` or `r g b[ / a]`.
        let (channels, alpha) = if args.contains(',') {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            match parts.as_slice() {
                [r, g, b] => ([*r, *g, *b], None),
                [r, g, b, a] => ([*r, *g, *b], Some(*a)),
                _ => return None,
            }
        } else {
            let (rgb, alpha) = match args.split_once('/') {
                Some((rgb, a)) => (rgb, Some(a.trim())),
                None => (args, None),
            };
            let parts: Vec<&str> = rgb.split_whitespace().collect();
            match parts.as_slice() {
                [r, g, b] => ([*r, *g, *b], alpha),
                _ => return None,
            }
        };
        let channel = |s: &str| s.parse::<u8>().ok();
        let [r, g, b] = channels;
        let (r, g, b) = (channel(r)?, channel(g)?, channel(b)?);
        match alpha {
            None => Some(Self::Rgb { r, g, b }),
            Some(a) => {
                let a = match a.strip_suffix('%') {
                    Some(percent) => percent.trim().parse::<f32>().ok()? / 100.0,
                    None => a.parse::<f32>().ok()?,
                };
                (0.0..=1.0)
                    .contains(&a)
                    .then_some(Self::Rgba { r, g, b, a })
            }
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Rgb { r, g, b } => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Rgba { r, g, b, a } => write!(f, "rgba({r}, {g}, {b}, {a})"),
            Self::Transparent => f.write_str("transparent"),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(D::Error::custom)
    }
}

/// Unit attached to a [`Length`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    /// CSS pixels.
    Px,
    /// Percentage of the element box.
    Percent,
    /// Relative to the element font size.
    Em,
    /// Relative to the root font size.
    Rem,
    /// Typographic points.
    Pt,
}

impl LengthUnit {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Percent => "%",
            Self::Em => "em",
            Self::Rem => "rem",
            Self::Pt => "pt",
        }
    }
}

/// A non-negative length with a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    /// Magnitude.
    pub value: f32,
    /// Unit.
    pub unit: LengthUnit,
}

impl Length {
    /// A length in pixels.
    #[must_use]
    pub const fn px(value: f32) -> Self {
        Self {
            value,
            unit: LengthUnit::Px,
        }
    }

    /// A percentage length.
    #[must_use]
    pub const fn percent(value: f32) -> Self {
        Self {
            value,
            unit: LengthUnit::Percent,
        }
    }

    /// Parse `"18px"`, `"50%"`, `"1.5em"`, `"2rem"`, `"12pt"` or a bare
    /// number (pixels).
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidLength`] for malformed or negative input.
    pub fn parse(input: &str) -> Result<Self, StyleError> {
        let value = input.trim().to_ascii_lowercase();
        let invalid = || StyleError::InvalidLength(input.to_string());
        let units = [
            LengthUnit::Rem,
            LengthUnit::Px,
            LengthUnit::Percent,
            LengthUnit::Em,
            LengthUnit::Pt,
        ];
        let (number, unit) = units
            .iter()
            .find_map(|unit| value.strip_suffix(unit.suffix()).map(|n| (n, *unit)))
            .unwrap_or((value.as_str(), LengthUnit::Px));
        let number: f32 = number.trim().parse().map_err(|_| invalid())?;
        Self::checked(number, unit).ok_or_else(invalid)
    }

    fn checked(value: f32, unit: LengthUnit) -> Option<Self> {
        (value.is_finite() && value >= 0.0).then_some(Self { value, unit })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// Font weight keyword or numeric weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    /// `normal` (400).
    Normal,
    /// `bold` (700).
    Bold,
    /// `lighter` than the parent.
    Lighter,
    /// `bolder` than the parent.
    Bolder,
    /// Numeric weight, 1 to 1000.
    Numeric(u16),
}

impl FontWeight {
    fn parse(input: &str) -> Result<Self, StyleError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "bold" => Ok(Self::Bold),
            "lighter" => Ok(Self::Lighter),
            "bolder" => Ok(Self::Bolder),
            other => other
                .parse::<u16>()
                .ok()
                .filter(|w| (1..=1000).contains(w))
                .map(Self::Numeric)
                .ok_or_else(|| StyleError::InvalidKeyword {
                    property: "fontWeight",
                    value: input.to_string(),
                }),
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::Bold => f.write_str("bold"),
            Self::Lighter => f.write_str("lighter"),
            Self::Bolder => f.write_str("bolder"),
            Self::Numeric(w) => write!(f, "{w}"),
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// Left aligned.
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
    /// Justified.
    Justify,
}

/// How an image fills its element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectFit {
    /// Stretch to fill.
    Fill,
    /// Fit inside, preserving aspect ratio.
    Contain,
    /// Cover the box, preserving aspect ratio.
    Cover,
    /// Natural size.
    None,
    /// The smaller of `None` and `Contain`.
    ScaleDown,
}

macro_rules! keyword_enum {
    ($ty:ident, $prop:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            fn parse(input: &str) -> Result<Self, StyleError> {
                match input.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(StyleError::InvalidKeyword {
                        property: $prop,
                        value: input.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $text,)+
                })
            }
        }
    };
}

keyword_enum!(TextAlign, "textAlign", {
    Left => "left",
    Center => "center",
    Right => "right",
    Justify => "justify",
});

keyword_enum!(ObjectFit, "objectFit", {
    Fill => "fill",
    Contain => "contain",
    Cover => "cover",
    None => "none",
    ScaleDown => "scale-down",
});

/// One typed style declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleProperty {
    /// Text color.
    Color(Color),
    /// Fill color.
    BackgroundColor(Color),
    /// Font family list, verbatim.
    FontFamily(String),
    /// Font size.
    FontSize(Length),
    /// Font weight.
    FontWeight(FontWeight),
    /// Text alignment.
    TextAlign(TextAlign),
    /// Border color.
    BorderColor(Color),
    /// Border width.
    BorderWidth(Length),
    /// Corner radius.
    BorderRadius(Length),
    /// Image fitting mode.
    ObjectFit(ObjectFit),
}

impl StyleProperty {
    /// The key this declaration is stored under.
    #[must_use]
    pub const fn key(&self) -> StyleKey {
        match self {
            Self::Color(_) => StyleKey::Color,
            Self::BackgroundColor(_) => StyleKey::BackgroundColor,
            Self::FontFamily(_) => StyleKey::FontFamily,
            Self::FontSize(_) => StyleKey::FontSize,
            Self::FontWeight(_) => StyleKey::FontWeight,
            Self::TextAlign(_) => StyleKey::TextAlign,
            Self::BorderColor(_) => StyleKey::BorderColor,
            Self::BorderWidth(_) => StyleKey::BorderWidth,
            Self::BorderRadius(_) => StyleKey::BorderRadius,
            Self::ObjectFit(_) => StyleKey::ObjectFit,
        }
    }

    /// Parse a value for a known key from its CSS text.
    ///
    /// # Errors
    ///
    /// Returns a [`StyleError`] if the value does not fit the property.
    pub fn parse(key: StyleKey, value: &str) -> Result<Self, StyleError> {
        Ok(match key {
            StyleKey::Color => Self::Color(Color::parse(value)?),
            StyleKey::BackgroundColor => Self::BackgroundColor(Color::parse(value)?),
            StyleKey::BorderColor => Self::BorderColor(Color::parse(value)?),
            StyleKey::FontFamily => {
                let family = value.trim();
                if family.is_empty() {
                    return Err(StyleError::InvalidKeyword {
                        property: "fontFamily",
                        value: value.to_string(),
                    });
                }
                Self::FontFamily(family.to_string())
            }
            StyleKey::FontSize => Self::FontSize(Length::parse(value)?),
            StyleKey::BorderWidth => Self::BorderWidth(Length::parse(value)?),
            StyleKey::BorderRadius => Self::BorderRadius(Length::parse(value)?),
            StyleKey::FontWeight => Self::FontWeight(FontWeight::parse(value)?),
            StyleKey::TextAlign => Self::TextAlign(TextAlign::parse(value)?),
            StyleKey::ObjectFit => Self::ObjectFit(ObjectFit::parse(value)?),
        })
    }

    /// Parse a value given as JSON (strings, or numbers for lengths and
    /// weights).
    ///
    /// # Errors
    ///
    /// Returns a [`StyleError`] if the value does not fit the property.
    pub fn from_json(key: StyleKey, value: &serde_json::Value) -> Result<Self, StyleError> {
        match value {
            serde_json::Value::String(s) => Self::parse(key, s),
            serde_json::Value::Number(n) => Self::parse(key, &n.to_string()),
            other => Self::parse(key, &other.to_string()),
        }
    }

    /// The CSS text for this value.
    #[must_use]
    pub fn css_value(&self) -> String {
        match self {
            Self::Color(c) | Self::BackgroundColor(c) | Self::BorderColor(c) => c.to_string(),
            Self::FontFamily(family) => family.clone(),
            Self::FontSize(l) | Self::BorderWidth(l) | Self::BorderRadius(l) => l.to_string(),
            Self::FontWeight(w) => w.to_string(),
            Self::TextAlign(a) => a.to_string(),
            Self::ObjectFit(fit) => fit.to_string(),
        }
    }
}

/// A set of style declarations, at most one per [`StyleKey`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    properties: BTreeMap<StyleKey, StyleProperty>,
}

/// A style declaration that was dropped while parsing a style bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedStyle {
    /// Property name as written.
    pub name: String,
    /// Why it was rejected.
    pub error: StyleError,
}

impl Style {
    /// Create an empty style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, property: StyleProperty) -> Self {
        self.set(property);
        self
    }

    /// Set a declaration, returning the one it replaced.
    pub fn set(&mut self, property: StyleProperty) -> Option<StyleProperty> {
        self.properties.insert(property.key(), property)
    }

    /// Get the declaration for a key.
    #[must_use]
    pub fn get(&self, key: StyleKey) -> Option<&StyleProperty> {
        self.properties.get(&key)
    }

    /// Whether a key is set.
    #[must_use]
    pub fn contains(&self, key: StyleKey) -> bool {
        self.properties.contains_key(&key)
    }

    /// Remove a declaration.
    pub fn remove(&mut self, key: StyleKey) -> Option<StyleProperty> {
        self.properties.remove(&key)
    }

    /// Overwrite only the keys present in `patch`; all others persist.
    pub fn merge(&mut self, patch: &Self) {
        for property in patch.properties.values() {
            self.set(property.clone());
        }
    }

    /// Iterate declarations in key order.
    pub fn iter(&self) -> impl Iterator<Item = &StyleProperty> {
        self.properties.values()
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether no declarations are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Parse a JSON style bag leniently.
    ///
    /// Unknown names are ignored. Known names with invalid values are
    /// dropped and reported in the returned list.
    #[must_use]
    pub fn from_json_map(
        map: &serde_json::Map<String, serde_json::Value>,
    ) -> (Self, Vec<RejectedStyle>) {
        let mut style = Self::new();
        let mut rejected = Vec::new();
        for (name, value) in map {
            let Some(key) = StyleKey::from_name(name) else {
                tracing::trace!("Ignoring unrecognized style property {name}");
                continue;
            };
            match StyleProperty::from_json(key, value) {
                Ok(property) => {
                    style.set(property);
                }
                Err(error) => rejected.push(RejectedStyle {
                    name: name.clone(),
                    error,
                }),
            }
        }
        (style, rejected)
    }
}

impl Serialize for Style {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len()))?;
        for (key, property) in &self.properties {
            map.serialize_entry(key.name(), &property.css_value())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Style {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let (style, rejected) = Self::from_json_map(&map);
        match rejected.into_iter().next() {
            Some(bad) => Err(D::Error::custom(format!("{}: {}", bad.name, bad.error))),
            None => Ok(style),
        }
    }
}

//! Layer style - fills, borders, shadows, and the text-style block
//!
//! Every style sub-block the format requires is always present, including
//! the ones this crate never enables (blur, border options, color controls).
//! Styles are owned by exactly one layer; identical-looking styles are still
//! separate instances with separate object IDs.

use crate::macros::int_enum;
use crate::{Color, FontChoice, ObjectId, Point};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enumerations
// =============================================================================

int_enum! {
    /// Compositing mode of a fill, border or shadow
    pub enum BlendMode: u8 {
        Normal = 0,
        Darken = 1,
        Multiply = 2,
        ColorBurn = 3,
        Lighten = 4,
        Screen = 5,
        ColorDodge = 6,
        Overlay = 7,
        SoftLight = 8,
        HardLight = 9,
        Difference = 10,
        Exclusion = 11,
        Hue = 12,
        Saturation = 13,
        Color = 14,
        Luminosity = 15,
    }
}

int_enum! {
    /// Paint source of a fill or border
    pub enum FillType: u8 {
        Color = 0,
        Gradient = 1,
        Pattern = 4,
        Noise = 5,
    }
}

int_enum! {
    /// Where a border is drawn relative to the path
    pub enum BorderPosition: u8 {
        Center = 0,
        Inside = 1,
        Outside = 2,
    }
}

int_enum! {
    pub enum GradientType: u8 {
        Linear = 0,
        Radial = 1,
        Angular = 2,
    }
}

int_enum! {
    pub enum BlurType: u8 {
        Gaussian = 0,
        Motion = 1,
        Zoom = 2,
        Background = 3,
    }
}

int_enum! {
    pub enum LineCapStyle: u8 {
        Butt = 0,
        Round = 1,
        Projecting = 2,
    }
}

int_enum! {
    pub enum LineJoinStyle: u8 {
        Miter = 0,
        Round = 1,
        Bevel = 2,
    }
}

int_enum! {
    pub enum MarkerType: u8 {
        None = 0,
        OpenArrow = 1,
        FilledArrow = 2,
        Line = 3,
        OpenCircle = 4,
        FilledCircle = 5,
        OpenSquare = 6,
        FilledSquare = 7,
    }
}

int_enum! {
    pub enum WindingRule: u8 {
        NonZero = 0,
        EvenOdd = 1,
    }
}

int_enum! {
    /// Horizontal paragraph alignment
    pub enum TextAlignment: u8 {
        Left = 0,
        Right = 1,
        Center = 2,
        Justified = 3,
        Natural = 4,
    }
}

int_enum! {
    /// Vertical alignment of text inside its frame
    pub enum TextVerticalAlignment: u8 {
        Top = 0,
        Middle = 1,
        Bottom = 2,
    }
}

// =============================================================================
// Paint Blocks
// =============================================================================

/// Blend mode and opacity of a paint (`_class: graphicsContextSettings`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "graphicsContextSettings", rename_all = "camelCase")]
pub struct GraphicsContextSettings {
    pub blend_mode: BlendMode,
    pub opacity: f64,
}

impl Default for GraphicsContextSettings {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::Normal,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "gradientStop")]
pub struct GradientStop {
    pub color: Color,
    pub position: f64,
}

/// Gradient block; present on every fill and border even when unused
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "gradient", rename_all = "camelCase")]
pub struct Gradient {
    pub elipse_length: f64,
    pub from: Point,
    pub gradient_type: GradientType,
    pub to: Point,
    pub stops: Vec<GradientStop>,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            elipse_length: 0.0,
            from: Point::new(0.5, 0.0),
            gradient_type: GradientType::Linear,
            to: Point::new(0.5, 1.0),
            stops: vec![
                GradientStop {
                    color: Color::WHITE,
                    position: 0.0,
                },
                GradientStop {
                    color: Color::BLACK,
                    position: 1.0,
                },
            ],
        }
    }
}

/// A solid fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "fill", rename_all = "camelCase")]
pub struct Fill {
    pub is_enabled: bool,
    pub fill_type: FillType,
    pub color: Color,
    pub context_settings: GraphicsContextSettings,
    pub gradient: Gradient,
    pub noise_index: f64,
    pub noise_intensity: f64,
    pub pattern_fill_type: u8,
    pub pattern_tile_scale: f64,
}

impl Fill {
    pub fn solid(color: Color) -> Self {
        Self {
            is_enabled: true,
            fill_type: FillType::Color,
            color,
            context_settings: GraphicsContextSettings::default(),
            gradient: Gradient::default(),
            noise_index: 0.0,
            noise_intensity: 0.0,
            pattern_fill_type: 1,
            pattern_tile_scale: 1.0,
        }
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.context_settings.blend_mode = blend_mode;
        self
    }
}

/// A solid stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "border", rename_all = "camelCase")]
pub struct Border {
    pub is_enabled: bool,
    pub fill_type: FillType,
    pub color: Color,
    pub context_settings: GraphicsContextSettings,
    pub gradient: Gradient,
    pub position: BorderPosition,
    pub thickness: f64,
}

/// Drop shadow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "shadow", rename_all = "camelCase")]
pub struct Shadow {
    pub is_enabled: bool,
    pub blur_radius: f64,
    pub color: Color,
    pub context_settings: GraphicsContextSettings,
    pub offset_x: f64,
    pub offset_y: f64,
    pub spread: f64,
}

/// Inner shadow. Same fields as [`Shadow`], distinct class tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "innerShadow", rename_all = "camelCase")]
pub struct InnerShadow {
    pub is_enabled: bool,
    pub blur_radius: f64,
    pub color: Color,
    pub context_settings: GraphicsContextSettings,
    pub offset_x: f64,
    pub offset_y: f64,
    pub spread: f64,
}

// =============================================================================
// Always-present Disabled Blocks
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "blur", rename_all = "camelCase")]
pub struct Blur {
    pub is_enabled: bool,
    pub center: Point,
    pub motion_angle: f64,
    pub radius: f64,
    pub saturation: f64,
    #[serde(rename = "type")]
    pub blur_type: BlurType,
}

impl Default for Blur {
    fn default() -> Self {
        Self {
            is_enabled: false,
            center: Point::new(0.5, 0.5),
            motion_angle: 0.0,
            radius: 10.0,
            saturation: 1.0,
            blur_type: BlurType::Gaussian,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "borderOptions", rename_all = "camelCase")]
pub struct BorderOptions {
    pub is_enabled: bool,
    pub dash_pattern: Vec<f64>,
    pub line_cap_style: LineCapStyle,
    pub line_join_style: LineJoinStyle,
}

impl Default for BorderOptions {
    fn default() -> Self {
        Self {
            is_enabled: true,
            dash_pattern: Vec::new(),
            line_cap_style: LineCapStyle::Butt,
            line_join_style: LineJoinStyle::Miter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "colorControls", rename_all = "camelCase")]
pub struct ColorControls {
    pub is_enabled: bool,
    pub brightness: f64,
    pub contrast: f64,
    pub hue: f64,
    pub saturation: f64,
}

impl Default for ColorControls {
    fn default() -> Self {
        Self {
            is_enabled: false,
            brightness: 0.0,
            contrast: 1.0,
            hue: 0.0,
            saturation: 1.0,
        }
    }
}

// =============================================================================
// Text Formatting
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontAttributes {
    pub name: String,
    pub size: f64,
}

/// Font reference (`_class: fontDescriptor`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "fontDescriptor")]
pub struct FontDescriptor {
    pub attributes: FontAttributes,
}

impl FontDescriptor {
    pub fn new(font: &FontChoice) -> Self {
        Self {
            attributes: FontAttributes {
                name: font.family.clone(),
                size: font.size,
            },
        }
    }

    pub fn to_font_choice(&self) -> FontChoice {
        FontChoice::new(self.attributes.name.clone(), self.attributes.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "paragraphStyle", rename_all = "camelCase")]
pub struct ParagraphStyle {
    pub alignment: TextAlignment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_line_height: Option<f64>,
}

impl ParagraphStyle {
    pub fn new(alignment: TextAlignment) -> Self {
        Self {
            alignment,
            maximum_line_height: None,
            minimum_line_height: None,
        }
    }
}

/// Attribute dictionary shared by attributed-string spans and the
/// text-style block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAttributes {
    #[serde(rename = "MSAttributedStringFontAttribute")]
    pub font: FontDescriptor,
    #[serde(rename = "MSAttributedStringColorAttribute")]
    pub color: Color,
    #[serde(rename = "paragraphStyle")]
    pub paragraph_style: ParagraphStyle,
    #[serde(
        rename = "textStyleVerticalAlignmentKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub vertical_alignment_key: Option<TextVerticalAlignment>,
    pub kerning: f64,
}

/// Style-level text formatting block (`_class: textStyle`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "textStyle", rename_all = "camelCase")]
pub struct TextStyle {
    pub encoded_attributes: TextAttributes,
    pub vertical_alignment: TextVerticalAlignment,
}

impl TextStyle {
    pub fn font(&self) -> FontChoice {
        self.encoded_attributes.font.to_font_choice()
    }
}

// =============================================================================
// Style
// =============================================================================

/// Paint/stroke/shadow/text bundle attached to one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "style", rename_all = "camelCase")]
pub struct Style {
    #[serde(rename = "do_objectID")]
    pub id: ObjectId,
    pub end_marker_type: MarkerType,
    pub miter_limit: f64,
    pub start_marker_type: MarkerType,
    pub winding_rule: WindingRule,
    pub blur: Blur,
    pub border_options: BorderOptions,
    pub borders: Vec<Border>,
    pub color_controls: ColorControls,
    pub context_settings: GraphicsContextSettings,
    pub fills: Vec<Fill>,
    pub inner_shadows: Vec<InnerShadow>,
    pub shadows: Vec<Shadow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_style: Option<TextStyle>,
}

impl Style {
    /// Empty style with every required block in its default form
    pub fn empty(id: ObjectId) -> Self {
        Self {
            id,
            end_marker_type: MarkerType::None,
            miter_limit: 10.0,
            start_marker_type: MarkerType::None,
            winding_rule: WindingRule::EvenOdd,
            blur: Blur::default(),
            border_options: BorderOptions::default(),
            borders: Vec::new(),
            color_controls: ColorControls::default(),
            context_settings: GraphicsContextSettings::default(),
            fills: Vec::new(),
            inner_shadows: Vec::new(),
            shadows: Vec::new(),
            text_style: None,
        }
    }
}

// =============================================================================
// Style Spec (constructor input)
// =============================================================================

/// Border request for [`StyleSpec`]
#[derive(Debug, Clone, PartialEq)]
pub struct BorderSpec {
    pub color: Color,
    pub thickness: f64,
    pub position: BorderPosition,
}

/// Shadow request for [`StyleSpec`]
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowSpec {
    pub color: Color,
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur_radius: f64,
    pub spread: f64,
}

impl Default for ShadowSpec {
    fn default() -> Self {
        Self {
            color: Color::SHADOW,
            offset_x: 0.0,
            offset_y: 2.0,
            blur_radius: 4.0,
            spread: 0.0,
        }
    }
}

/// Caller-facing description of a style, consumed by the node constructors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSpec {
    pub fills: Vec<Color>,
    pub blend_mode: Option<BlendMode>,
    pub borders: Vec<BorderSpec>,
    pub shadows: Vec<ShadowSpec>,
    /// Uniform corner radius (rectangles only)
    pub corner_radius: f64,
    pub opacity: Option<f64>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub text_color: Option<Color>,
    pub alignment: Option<TextAlignment>,
    pub vertical_alignment: Option<TextVerticalAlignment>,
}

impl StyleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(color: Color) -> Self {
        Self {
            fills: vec![color],
            ..Default::default()
        }
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fills.push(color);
        self
    }

    pub fn with_border(mut self, color: Color, thickness: f64, position: BorderPosition) -> Self {
        self.borders.push(BorderSpec {
            color,
            thickness,
            position,
        });
        self
    }

    pub fn with_shadow(mut self, shadow: ShadowSpec) -> Self {
        self.shadows.push(shadow);
        self
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn with_font(mut self, family: impl Into<String>, size: f64) -> Self {
        self.font_family = Some(family.into());
        self.font_size = Some(size);
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = Some(color);
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_vertical_alignment(mut self, alignment: TextVerticalAlignment) -> Self {
        self.vertical_alignment = Some(alignment);
        self
    }

    /// Whether any text formatting option was supplied
    pub fn has_text_options(&self) -> bool {
        self.font_family.is_some()
            || self.font_size.is_some()
            || self.text_color.is_some()
            || self.alignment.is_some()
            || self.vertical_alignment.is_some()
    }

    /// Requested font, with defaults filled in
    pub fn font(&self) -> FontChoice {
        let default = FontChoice::default();
        FontChoice::new(
            self.font_family.clone().unwrap_or(default.family),
            self.font_size.unwrap_or(default.size),
        )
    }

    /// Attribute dictionary for the given font under this spec
    pub fn text_attributes(&self, font: &FontChoice) -> TextAttributes {
        TextAttributes {
            font: FontDescriptor::new(font),
            color: self.text_color.unwrap_or(Color::BLACK),
            paragraph_style: ParagraphStyle::new(self.alignment.unwrap_or(TextAlignment::Left)),
            vertical_alignment_key: Some(self.vertical_alignment.unwrap_or(TextVerticalAlignment::Top)),
            kerning: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_style_has_required_blocks() {
        let style = Style::empty(ObjectId::from_random_bytes([1; 16]));
        let value = serde_json::to_value(&style).unwrap();

        assert_eq!(value["_class"], "style");
        assert_eq!(value["blur"]["_class"], "blur");
        assert_eq!(value["blur"]["isEnabled"], false);
        assert_eq!(value["borderOptions"]["_class"], "borderOptions");
        assert_eq!(value["colorControls"]["isEnabled"], false);
        assert_eq!(value["fills"], serde_json::json!([]));
        assert_eq!(value["borders"], serde_json::json!([]));
        assert_eq!(value["shadows"], serde_json::json!([]));
        assert!(value.get("textStyle").is_none());
    }

    #[test]
    fn test_int_enums_serialize_as_codes() {
        assert_eq!(serde_json::to_value(BorderPosition::Outside).unwrap(), 2);
        assert_eq!(serde_json::to_value(FillType::Noise).unwrap(), 5);
        assert_eq!(
            serde_json::from_value::<TextAlignment>(serde_json::json!(2)).unwrap(),
            TextAlignment::Center
        );
        assert!(serde_json::from_value::<FillType>(serde_json::json!(3)).is_err());
    }

    #[test]
    fn test_fill_json_shape() {
        let value = serde_json::to_value(Fill::solid(Color::WHITE).with_blend_mode(BlendMode::Multiply)).unwrap();
        assert_eq!(value["_class"], "fill");
        assert_eq!(value["fillType"], 0);
        assert_eq!(value["contextSettings"]["blendMode"], 2);
        assert_eq!(value["gradient"]["from"], "{0.5, 0}");
    }

    #[test]
    fn test_spec_text_options() {
        assert!(!StyleSpec::fill(Color::WHITE).has_text_options());
        assert!(StyleSpec::new().with_alignment(TextAlignment::Center).has_text_options());

        let font = StyleSpec::new().with_font("Helvetica", 12.0).font();
        assert_eq!(font, FontChoice::new("Helvetica", 12.0));
        assert_eq!(StyleSpec::new().font(), FontChoice::default());
    }
}

//! Layer nodes - the positioned elements of the design tree
//!
//! `Layer` is a closed sum type over the variants this crate builds. The
//! serialized `_class` tag selects the variant; [`LayerClass`] is the wider
//! set of tags the format defines, used by the validator to tell "known but
//! not modelled" apart from "unknown".

use crate::macros::int_enum;
use crate::{format_rect_string, Color, ObjectId, Point, Rect, Style};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Enumerations
// =============================================================================

int_enum! {
    pub enum BooleanOperation: i8 {
        None = -1,
        Union = 0,
        Subtract = 1,
        Intersect = 2,
        Difference = 3,
    }
}

int_enum! {
    /// Resizing constraint bitmask. Unset bits pin an edge or fix a size.
    pub enum ResizingConstraint: u8 {
        /// No edge pinned, no size fixed
        Free = 63,
        /// Pinned to top and left with fixed width and height
        PinTopLeftFixedSize = 9,
        /// Pinned to left and right with fixed height
        StretchHorizontally = 43,
    }
}

int_enum! {
    pub enum ResizingType: u8 {
        Stretch = 0,
        PinToCorner = 1,
        ResizeObject = 2,
        FloatInPlace = 3,
    }
}

int_enum! {
    pub enum LayerListExpandedType: u8 {
        Undecided = 0,
        Collapsed = 1,
        Expanded = 2,
    }
}

int_enum! {
    pub enum ClippingMaskMode: u8 {
        Outline = 0,
        Alpha = 1,
    }
}

int_enum! {
    pub enum CornerStyle: u8 {
        Rounded = 0,
        RoundedInverted = 1,
        Angled = 2,
        Squared = 3,
    }
}

int_enum! {
    pub enum CurveMode: u8 {
        None = 0,
        Straight = 1,
        Mirrored = 2,
        Asymmetric = 3,
        Disconnected = 4,
    }
}

int_enum! {
    pub enum PointRadiusBehaviour: i8 {
        Disabled = -1,
        Legacy = 0,
        Rounded = 1,
        Smooth = 2,
    }
}

int_enum! {
    /// How a text layer's frame follows its content
    pub enum TextBehaviour: u8 {
        Flexible = 0,
        Fixed = 1,
        FixedWidthAndHeight = 2,
    }
}

int_enum! {
    pub enum LineSpacingBehaviour: u8 {
        None = 0,
        Legacy = 1,
        ConsistentBaseline = 2,
    }
}

// =============================================================================
// Shared Substructures
// =============================================================================

/// One export preset (`_class: exportFormat`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "exportFormat", rename_all = "camelCase")]
pub struct ExportFormat {
    pub absolute_size: f64,
    pub file_format: String,
    pub name: String,
    pub naming_scheme: u8,
    pub scale: f64,
    pub visible_scale_type: u8,
}

impl ExportFormat {
    /// PNG export at a scale factor, named `@<scale>x` as the format does
    pub fn png(scale: f64) -> Self {
        Self {
            absolute_size: 0.0,
            file_format: "png".to_string(),
            name: if scale == 1.0 { String::new() } else { format!("@{scale}x") },
            naming_scheme: 0,
            scale,
            visible_scale_type: 0,
        }
    }
}

/// Export settings of a layer; empty-but-present by default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "exportOptions", rename_all = "camelCase")]
pub struct ExportOptions {
    pub export_formats: Vec<ExportFormat>,
    pub included_layer_ids: Vec<ObjectId>,
    pub layer_options: u8,
    pub should_trim: bool,
}

/// Ruler state of a page or artboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "rulerData")]
pub struct RulerData {
    pub base: f64,
    pub guides: Vec<f64>,
}

/// Freeform group layout marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "MSImmutableFreeformGroupLayout")]
pub struct FreeformGroupLayout {}

// =============================================================================
// Layer Base
// =============================================================================

/// Attributes shared by every layer variant (and by pages)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerBase {
    #[serde(rename = "do_objectID")]
    pub id: ObjectId,
    pub boolean_operation: BooleanOperation,
    pub export_options: ExportOptions,
    pub frame: Rect,
    pub is_fixed_to_viewport: bool,
    pub is_flipped_horizontal: bool,
    pub is_flipped_vertical: bool,
    pub is_locked: bool,
    pub is_visible: bool,
    pub layer_list_expanded_type: LayerListExpandedType,
    pub name: String,
    pub name_is_fixed: bool,
    pub resizing_constraint: ResizingConstraint,
    pub resizing_type: ResizingType,
    pub rotation: f64,
    pub should_break_mask_chain: bool,
    pub has_clipping_mask: bool,
    pub clipping_mask_mode: ClippingMaskMode,
    pub style: Style,
}

// =============================================================================
// Rectangle
// =============================================================================

/// Corner of a path (`_class: curvePoint`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "curvePoint", rename_all = "camelCase")]
pub struct CurvePoint {
    pub corner_radius: f64,
    pub corner_style: CornerStyle,
    pub curve_from: Point,
    pub curve_mode: CurveMode,
    pub curve_to: Point,
    pub has_curve_from: bool,
    pub has_curve_to: bool,
    /// Position normalized to the layer frame
    pub point: Point,
}

impl CurvePoint {
    /// Straight corner at a normalized position
    pub fn corner(point: Point, corner_radius: f64) -> Self {
        Self {
            corner_radius,
            corner_style: CornerStyle::Rounded,
            curve_from: point,
            curve_mode: CurveMode::Straight,
            curve_to: point,
            has_curve_from: false,
            has_curve_to: false,
            point,
        }
    }
}

/// Normalized positions of a rectangle's corners, clockwise from top-left
pub const RECTANGLE_CORNERS: [Point; 4] = [
    Point::new(0.0, 0.0),
    Point::new(1.0, 0.0),
    Point::new(1.0, 1.0),
    Point::new(0.0, 1.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    #[serde(flatten)]
    pub base: LayerBase,
    pub edited: bool,
    pub is_closed: bool,
    pub point_radius_behaviour: PointRadiusBehaviour,
    /// Always four points. Every point carries the same radius.
    pub points: Vec<CurvePoint>,
    pub fixed_radius: f64,
    pub has_converted_to_new_round_corners: bool,
    pub needs_convertion_to_new_round_corners: bool,
}

// =============================================================================
// Text
// =============================================================================

/// One formatting span over `[location, location + length)` in UTF-16 units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "stringAttribute")]
pub struct StringAttribute {
    pub location: usize,
    pub length: usize,
    pub attributes: crate::TextAttributes,
}

/// Text content paired with per-range formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "attributedString")]
pub struct AttributedString {
    pub string: String,
    pub attributes: Vec<StringAttribute>,
}

impl AttributedString {
    /// Length of the string in UTF-16 code units
    pub fn utf16_len(&self) -> usize {
        utf16_len(&self.string)
    }
}

/// Length of a string in UTF-16 code units, the unit spans are measured in
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(flatten)]
    pub base: LayerBase,
    pub attributed_string: AttributedString,
    pub automatically_draw_on_underlying_path: bool,
    pub dont_synchronise_with_symbol: bool,
    pub glyph_bounds: String,
    pub line_spacing_behaviour: LineSpacingBehaviour,
    pub text_behaviour: TextBehaviour,
}

impl Text {
    pub fn content(&self) -> &str {
        &self.attributed_string.string
    }

    pub(crate) fn glyph_bounds_for(frame: &Rect) -> String {
        format_rect_string(0.0, 0.0, frame.width, frame.height)
    }
}

// =============================================================================
// Containers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(flatten)]
    pub base: LayerBase,
    pub has_click_through: bool,
    pub group_layout: FreeformGroupLayout,
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeGroup {
    #[serde(flatten)]
    pub base: LayerBase,
    pub has_click_through: bool,
    pub group_layout: FreeformGroupLayout,
    pub layers: Vec<Layer>,
}

/// A fixed-size canvas. The first layer is always the background rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artboard {
    #[serde(flatten)]
    pub base: LayerBase,
    pub background_color: Color,
    pub has_background_color: bool,
    pub include_background_color_in_export: bool,
    pub has_click_through: bool,
    pub group_layout: FreeformGroupLayout,
    pub horizontal_ruler_data: RulerData,
    pub vertical_ruler_data: RulerData,
    pub include_in_cloud_upload: bool,
    pub is_flow_home: bool,
    pub resizes_content: bool,
    pub preset_dictionary: BTreeMap<String, serde_json::Value>,
    pub(crate) layers: Vec<Layer>,
}

impl Artboard {
    /// All layers, background first
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The background rectangle
    pub fn background(&self) -> Option<&Layer> {
        self.layers.first()
    }

    /// Append a layer above the existing ones
    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }
}

// =============================================================================
// Layer Sum Type
// =============================================================================

/// Any positioned element of the design tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class")]
pub enum Layer {
    #[serde(rename = "rectangle")]
    Rectangle(Rectangle),
    #[serde(rename = "text")]
    Text(Text),
    #[serde(rename = "group")]
    Group(Group),
    #[serde(rename = "shapeGroup")]
    ShapeGroup(ShapeGroup),
    #[serde(rename = "artboard")]
    Artboard(Artboard),
}

impl Layer {
    pub fn base(&self) -> &LayerBase {
        match self {
            Layer::Rectangle(l) => &l.base,
            Layer::Text(l) => &l.base,
            Layer::Group(l) => &l.base,
            Layer::ShapeGroup(l) => &l.base,
            Layer::Artboard(l) => &l.base,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.base().id
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn frame(&self) -> &Rect {
        &self.base().frame
    }

    pub fn class(&self) -> LayerClass {
        match self {
            Layer::Rectangle(_) => LayerClass::Rectangle,
            Layer::Text(_) => LayerClass::Text,
            Layer::Group(_) => LayerClass::Group,
            Layer::ShapeGroup(_) => LayerClass::ShapeGroup,
            Layer::Artboard(_) => LayerClass::Artboard,
        }
    }

    /// Direct children (empty for leaf variants)
    pub fn children(&self) -> &[Layer] {
        match self {
            Layer::Rectangle(_) | Layer::Text(_) => &[],
            Layer::Group(l) => &l.layers,
            Layer::ShapeGroup(l) => &l.layers,
            Layer::Artboard(l) => &l.layers,
        }
    }

    /// Object IDs of this layer, its style, and every descendant
    pub fn collect_ids(&self, out: &mut Vec<ObjectId>) {
        out.push(self.id());
        out.push(self.base().style.id);
        for child in self.children() {
            child.collect_ids(out);
        }
    }

    /// Depth-first search for the first layer matching `pred`
    pub fn find(&self, pred: &dyn Fn(&Layer) -> bool) -> Option<&Layer> {
        if pred(self) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(pred))
    }
}

impl From<Rectangle> for Layer {
    fn from(layer: Rectangle) -> Self {
        Layer::Rectangle(layer)
    }
}

impl From<Text> for Layer {
    fn from(layer: Text) -> Self {
        Layer::Text(layer)
    }
}

impl From<Group> for Layer {
    fn from(layer: Group) -> Self {
        Layer::Group(layer)
    }
}

impl From<ShapeGroup> for Layer {
    fn from(layer: ShapeGroup) -> Self {
        Layer::ShapeGroup(layer)
    }
}

impl From<Artboard> for Layer {
    fn from(layer: Artboard) -> Self {
        Layer::Artboard(layer)
    }
}

/// Every layer `_class` tag the format defines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerClass {
    Rectangle,
    Text,
    Group,
    ShapeGroup,
    Artboard,
    // Known to the format, no model rule yet
    Oval,
    ShapePath,
    Bitmap,
    SymbolInstance,
    SymbolMaster,
    Slice,
    Star,
    Polygon,
    Triangle,
    Hotspot,
}

impl LayerClass {
    pub const ALL: [LayerClass; 15] = [
        LayerClass::Rectangle,
        LayerClass::Text,
        LayerClass::Group,
        LayerClass::ShapeGroup,
        LayerClass::Artboard,
        LayerClass::Oval,
        LayerClass::ShapePath,
        LayerClass::Bitmap,
        LayerClass::SymbolInstance,
        LayerClass::SymbolMaster,
        LayerClass::Slice,
        LayerClass::Star,
        LayerClass::Polygon,
        LayerClass::Triangle,
        LayerClass::Hotspot,
    ];

    /// The `_class` tag
    pub const fn tag(self) -> &'static str {
        match self {
            LayerClass::Rectangle => "rectangle",
            LayerClass::Text => "text",
            LayerClass::Group => "group",
            LayerClass::ShapeGroup => "shapeGroup",
            LayerClass::Artboard => "artboard",
            LayerClass::Oval => "oval",
            LayerClass::ShapePath => "shapePath",
            LayerClass::Bitmap => "bitmap",
            LayerClass::SymbolInstance => "symbolInstance",
            LayerClass::SymbolMaster => "symbolMaster",
            LayerClass::Slice => "slice",
            LayerClass::Star => "star",
            LayerClass::Polygon => "polygon",
            LayerClass::Triangle => "triangle",
            LayerClass::Hotspot => "MSImmutableHotspotLayer",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.tag() == tag)
    }

    /// Whether `Layer` has a variant (and the validator a full rule) for it
    pub const fn is_modeled(self) -> bool {
        matches!(
            self,
            LayerClass::Rectangle
                | LayerClass::Text
                | LayerClass::Group
                | LayerClass::ShapeGroup
                | LayerClass::Artboard
        )
    }

    /// Whether layers of this class own a `layers` array
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            LayerClass::Group | LayerClass::ShapeGroup | LayerClass::Artboard | LayerClass::SymbolMaster
        )
    }
}

impl std::fmt::Display for LayerClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

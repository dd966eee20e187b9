//! Node constructors with an injected random source
//!
//! Every structural node gets its object ID here, at construction. The random
//! source is a type parameter so tests can run with a seeded generator and
//! get byte-identical documents.

use crate::{
    utf16_len, AssetCollection, Artboard, AttributedString, BlendMode, Border, BooleanOperation,
    ClippingMaskMode, Color, CurvePoint, Document, DocumentState, ExportOptions, Fill, FillType,
    FreeformGroupLayout, Gradient, GraphicsContextSettings, Group, Layer, LayerBase, LayerClass,
    LayerListExpandedType, LineSpacingBehaviour, ModelError, ObjectId, Page, PointRadiusBehaviour,
    Rect, Rectangle, ResizingConstraint, ResizingType, Result, RulerData, Shadow, ShapeGroup,
    SharedCollections, SharedStyleContainer, SharedTextStyleContainer, StringAttribute, Style,
    StyleSpec, SwatchContainer, SymbolContainer, Text, TextBehaviour, TextStyle,
    TextVerticalAlignment, FORMAT_VERSION, RECTANGLE_CORNERS,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::BTreeMap;

/// Name given to an artboard's background rectangle
pub const BACKGROUND_LAYER_NAME: &str = "Background";

/// Per-layer settings for [`NodeFactory::new_layer_base`]
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOptions {
    pub name: String,
    pub style: StyleSpec,
    pub is_visible: bool,
    pub is_locked: bool,
    pub resizing_constraint: ResizingConstraint,
    pub rotation: f64,
    pub has_clipping_mask: bool,
}

impl LayerOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: StyleSpec) -> Self {
        self.style = style;
        self
    }
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            style: StyleSpec::default(),
            is_visible: true,
            is_locked: false,
            resizing_constraint: ResizingConstraint::Free,
            rotation: 0.0,
            has_clipping_mask: false,
        }
    }
}

/// Builds nodes, drawing object IDs from `R`
pub struct NodeFactory<R: RngCore = StdRng> {
    rng: R,
}

impl NodeFactory<StdRng> {
    /// Factory seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic factory for reproducible output
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for NodeFactory<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> NodeFactory<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// A fresh canonical object ID
    pub fn new_identifier(&mut self) -> ObjectId {
        ObjectId::generate(&mut self.rng)
    }

    // =========================================================================
    // Base and Style
    // =========================================================================

    /// Shared layer attributes with defaults applied
    pub fn new_layer_base(
        &mut self,
        class: LayerClass,
        frame: Rect,
        options: LayerOptions,
    ) -> Result<LayerBase> {
        frame.check()?;
        if options.name.is_empty() {
            return Err(ModelError::MissingArgument("name"));
        }

        let layer_list_expanded_type = if class.is_container() {
            LayerListExpandedType::Collapsed
        } else {
            LayerListExpandedType::Undecided
        };

        Ok(LayerBase {
            id: self.new_identifier(),
            boolean_operation: BooleanOperation::None,
            export_options: ExportOptions::default(),
            frame,
            is_fixed_to_viewport: false,
            is_flipped_horizontal: false,
            is_flipped_vertical: false,
            is_locked: options.is_locked,
            is_visible: options.is_visible,
            layer_list_expanded_type,
            name: options.name,
            name_is_fixed: false,
            resizing_constraint: options.resizing_constraint,
            resizing_type: ResizingType::Stretch,
            rotation: options.rotation,
            should_break_mask_chain: false,
            has_clipping_mask: options.has_clipping_mask,
            clipping_mask_mode: ClippingMaskMode::Outline,
            style: self.new_style(&options.style),
        })
    }

    /// Style from a spec. The text-style block is added only when the spec
    /// carries a text option.
    pub fn new_style(&mut self, spec: &StyleSpec) -> Style {
        let mut style = Style::empty(self.new_identifier());

        let blend_mode = spec.blend_mode.unwrap_or(BlendMode::Normal);
        style.fills = spec
            .fills
            .iter()
            .map(|color| Fill::solid(*color).with_blend_mode(blend_mode))
            .collect();

        style.borders = spec
            .borders
            .iter()
            .map(|border| Border {
                is_enabled: true,
                fill_type: FillType::Color,
                color: border.color,
                context_settings: GraphicsContextSettings::default(),
                gradient: Gradient::default(),
                position: border.position,
                thickness: border.thickness,
            })
            .collect();

        style.shadows = spec
            .shadows
            .iter()
            .map(|shadow| Shadow {
                is_enabled: true,
                blur_radius: shadow.blur_radius,
                color: shadow.color,
                context_settings: GraphicsContextSettings::default(),
                offset_x: shadow.offset_x,
                offset_y: shadow.offset_y,
                spread: shadow.spread,
            })
            .collect();

        if let Some(opacity) = spec.opacity {
            style.context_settings.opacity = opacity;
        }

        if spec.has_text_options() {
            style.text_style = Some(TextStyle {
                encoded_attributes: spec.text_attributes(&spec.font()),
                vertical_alignment: spec
                    .vertical_alignment
                    .unwrap_or(TextVerticalAlignment::Top),
            });
        }

        style
    }

    // =========================================================================
    // Leaf Layers
    // =========================================================================

    /// Rectangle with four corner points sharing one radius
    pub fn new_rectangle(
        &mut self,
        frame: Rect,
        spec: &StyleSpec,
        name: impl Into<String>,
    ) -> Result<Rectangle> {
        let base = self.new_layer_base(
            LayerClass::Rectangle,
            frame,
            LayerOptions::named(name).with_style(spec.clone()),
        )?;
        let radius = spec.corner_radius;

        Ok(Rectangle {
            base,
            edited: false,
            is_closed: true,
            point_radius_behaviour: PointRadiusBehaviour::Rounded,
            points: RECTANGLE_CORNERS
                .iter()
                .map(|corner| CurvePoint::corner(*corner, radius))
                .collect(),
            fixed_radius: radius,
            has_converted_to_new_round_corners: true,
            needs_convertion_to_new_round_corners: false,
        })
    }

    /// Text layer named after its content.
    ///
    /// The span carries the requested font verbatim; the style-level block
    /// carries [`crate::FontChoice::derive_style_font`] of it.
    pub fn new_text(
        &mut self,
        content: impl Into<String>,
        frame: Rect,
        spec: &StyleSpec,
    ) -> Result<Text> {
        let content = content.into();
        if content.is_empty() {
            return Err(ModelError::MissingArgument("content"));
        }

        let mut base = self.new_layer_base(
            LayerClass::Text,
            frame,
            LayerOptions::named(content.clone()).with_style(spec.clone()),
        )?;

        let attribute_font = spec.font();
        let style_font = attribute_font.derive_style_font(&content);
        base.style.text_style = Some(TextStyle {
            encoded_attributes: spec.text_attributes(&style_font),
            vertical_alignment: spec
                .vertical_alignment
                .unwrap_or(TextVerticalAlignment::Top),
        });

        let span = StringAttribute {
            location: 0,
            length: utf16_len(&content),
            attributes: spec.text_attributes(&attribute_font),
        };

        Ok(Text {
            glyph_bounds: Text::glyph_bounds_for(&base.frame),
            base,
            attributed_string: AttributedString {
                string: content,
                attributes: vec![span],
            },
            automatically_draw_on_underlying_path: false,
            dont_synchronise_with_symbol: false,
            line_spacing_behaviour: LineSpacingBehaviour::ConsistentBaseline,
            text_behaviour: TextBehaviour::Fixed,
        })
    }

    // =========================================================================
    // Containers
    // =========================================================================

    pub fn new_group(
        &mut self,
        name: impl Into<String>,
        frame: Rect,
        children: Vec<Layer>,
    ) -> Result<Group> {
        let base = self.new_layer_base(LayerClass::Group, frame, LayerOptions::named(name))?;
        Ok(Group {
            base,
            has_click_through: false,
            group_layout: FreeformGroupLayout::default(),
            layers: children,
        })
    }

    pub fn new_shape_group(
        &mut self,
        name: impl Into<String>,
        frame: Rect,
        children: Vec<Layer>,
    ) -> Result<ShapeGroup> {
        let base = self.new_layer_base(LayerClass::ShapeGroup, frame, LayerOptions::named(name))?;
        Ok(ShapeGroup {
            base,
            has_click_through: false,
            group_layout: FreeformGroupLayout::default(),
            layers: children,
        })
    }

    /// Artboard at the page origin whose first child is a clipping
    /// background rectangle covering the whole frame
    pub fn new_artboard(
        &mut self,
        name: impl Into<String>,
        width: f64,
        height: f64,
        background_color: Color,
    ) -> Result<Artboard> {
        let frame = Rect::from_size(width, height)?;
        let base = self.new_layer_base(LayerClass::Artboard, frame, LayerOptions::named(name))?;

        let mut background = self.new_rectangle(
            Rect::from_size(width, height)?,
            &StyleSpec::fill(background_color),
            BACKGROUND_LAYER_NAME,
        )?;
        background.base.has_clipping_mask = true;

        Ok(Artboard {
            base,
            background_color,
            has_background_color: true,
            include_background_color_in_export: true,
            has_click_through: true,
            group_layout: FreeformGroupLayout::default(),
            horizontal_ruler_data: RulerData::default(),
            vertical_ruler_data: RulerData::default(),
            include_in_cloud_upload: true,
            is_flow_home: false,
            resizes_content: false,
            preset_dictionary: BTreeMap::new(),
            layers: vec![background.into()],
        })
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    pub fn new_page(&mut self, name: impl Into<String>, children: Vec<Layer>) -> Result<Page> {
        let base = self.new_layer_base(LayerClass::Group, Rect::zero(), LayerOptions::named(name))?;
        Ok(Page {
            base,
            has_click_through: true,
            group_layout: FreeformGroupLayout::default(),
            layers: children,
            horizontal_ruler_data: RulerData::default(),
            vertical_ruler_data: RulerData::default(),
            include_in_cloud_upload: true,
        })
    }

    /// Document root over at least one page, with every shared collection
    /// present and empty
    pub fn new_document(&mut self, pages: Vec<Page>) -> Result<Document> {
        if pages.is_empty() {
            return Err(ModelError::MissingArgument("pages"));
        }

        let id = self.new_identifier();
        let shared = SharedCollections {
            assets: AssetCollection::empty(self.new_identifier()),
            color_space: 1,
            current_page_index: 0,
            foreign_layer_styles: Vec::new(),
            foreign_symbols: Vec::new(),
            foreign_text_styles: Vec::new(),
            foreign_swatches: Vec::new(),
            layer_styles: SharedStyleContainer::empty(self.new_identifier()),
            layer_text_styles: SharedTextStyleContainer::empty(self.new_identifier()),
            layer_symbols: SymbolContainer::empty(self.new_identifier()),
            shared_swatches: SwatchContainer::empty(self.new_identifier()),
            font_references: Vec::new(),
            document_state: DocumentState::default(),
        };

        Ok(Document {
            id,
            version: FORMAT_VERSION,
            shared,
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{is_canonical_object_id, hex_to_color, FontChoice, CJK_SEMIBOLD};
    use std::collections::HashSet;

    fn factory() -> NodeFactory {
        NodeFactory::seeded(1234)
    }

    #[test]
    fn test_seeded_factories_agree() {
        let a = factory().new_identifier();
        let b = factory().new_identifier();
        assert_eq!(a, b);
    }

    #[test]
    fn test_layer_base_defaults() {
        let mut f = factory();
        let base = f
            .new_layer_base(
                LayerClass::Rectangle,
                Rect::new(1.0, 2.0, 3.0, 4.0).unwrap(),
                LayerOptions::named("Box"),
            )
            .unwrap();

        assert!(base.is_visible);
        assert!(!base.is_locked);
        assert_eq!(base.rotation, 0.0);
        assert_eq!(base.resizing_constraint.code(), 63);
        assert!(base.export_options.export_formats.is_empty());
        assert_ne!(base.id, base.style.id);
    }

    #[test]
    fn test_layer_base_rejects_bad_input() {
        let mut f = factory();
        let negative = Rect {
            width: -1.0,
            ..Rect::zero()
        };
        assert!(matches!(
            f.new_layer_base(LayerClass::Rectangle, negative, LayerOptions::named("x")),
            Err(ModelError::InvalidGeometry { field: "width", .. })
        ));
        assert_eq!(
            f.new_layer_base(LayerClass::Group, Rect::zero(), LayerOptions::default()),
            Err(ModelError::MissingArgument("name"))
        );
    }

    #[test]
    fn test_rectangle_has_four_uniform_corners() {
        let mut f = factory();
        let spec = StyleSpec::fill(Color::WHITE).with_corner_radius(8.0);
        let rect = f
            .new_rectangle(Rect::from_size(100.0, 40.0).unwrap(), &spec, "Card")
            .unwrap();

        assert_eq!(rect.points.len(), 4);
        assert!(rect.points.iter().all(|p| p.corner_radius == 8.0));
        assert_eq!(rect.fixed_radius, 8.0);
        assert_eq!(rect.points[2].point, crate::Point::new(1.0, 1.0));
        assert_eq!(rect.base.style.fills.len(), 1);
        assert!(rect.base.style.text_style.is_none());
    }

    #[test]
    fn test_style_text_block_only_with_text_options() {
        let mut f = factory();
        assert!(f.new_style(&StyleSpec::fill(Color::BLACK)).text_style.is_none());

        let style = f.new_style(&StyleSpec::new().with_text_color(Color::WHITE));
        let text_style = style.text_style.unwrap();
        assert_eq!(text_style.encoded_attributes.color, Color::WHITE);
    }

    #[test]
    fn test_cjk_text_font_derivation() {
        let mut f = factory();
        let spec = StyleSpec::new().with_font("SFProText-Semibold", 18.0);
        let text = f
            .new_text("我的订单", Rect::from_size(200.0, 25.0).unwrap(), &spec)
            .unwrap();

        let span = &text.attributed_string.attributes[0];
        assert_eq!(span.attributes.font.to_font_choice(), FontChoice::new("SFProText-Semibold", 18.0));

        let style_font = text.base.style.text_style.as_ref().unwrap().font();
        assert_eq!(style_font.family, CJK_SEMIBOLD);
        assert_eq!(style_font.size, 22.0);
    }

    #[test]
    fn test_latin_text_fonts_agree() {
        let mut f = factory();
        let text = f
            .new_text("Orders", Rect::from_size(80.0, 20.0).unwrap(), &StyleSpec::new())
            .unwrap();

        let span_font = text.attributed_string.attributes[0].attributes.font.to_font_choice();
        let style_font = text.base.style.text_style.as_ref().unwrap().font();
        assert_eq!(span_font, style_font);
        assert_eq!(span_font, FontChoice::default());
        assert_eq!(text.base.name, "Orders");
        assert_eq!(text.glyph_bounds, "{{0, 0}, {80, 20}}");
    }

    #[test]
    fn test_text_span_length_in_utf16_units() {
        let mut f = factory();
        let text = f
            .new_text("a😀", Rect::from_size(10.0, 10.0).unwrap(), &StyleSpec::new())
            .unwrap();
        assert_eq!(text.attributed_string.attributes[0].length, 3);
    }

    #[test]
    fn test_empty_text_rejected() {
        let mut f = factory();
        assert_eq!(
            f.new_text("", Rect::zero(), &StyleSpec::new()).unwrap_err(),
            ModelError::MissingArgument("content")
        );
    }

    #[test]
    fn test_artboard_background_first() {
        let mut f = factory();
        let bg = hex_to_color("#F5F5F5").unwrap();
        let artboard = f.new_artboard("Screen", 393.0, 852.0, bg).unwrap();

        assert_eq!(artboard.layers().len(), 1);
        let Some(Layer::Rectangle(background)) = artboard.background() else {
            panic!("background is not a rectangle");
        };
        assert_eq!(background.base.frame, Rect::from_size(393.0, 852.0).unwrap());
        assert!(background.base.has_clipping_mask);
        assert_eq!(background.base.style.fills[0].color, bg);
        assert_eq!(artboard.background_color, bg);
        assert!(artboard.has_background_color);
    }

    #[test]
    fn test_document_requires_pages() {
        let mut f = factory();
        assert_eq!(
            f.new_document(Vec::new()).unwrap_err(),
            ModelError::MissingArgument("pages")
        );
    }

    #[test]
    fn test_document_ids_unique_and_canonical() {
        let mut f = factory();
        let mut artboard = f.new_artboard("Screen", 100.0, 100.0, Color::WHITE).unwrap();
        let label = f
            .new_text("Hi", Rect::from_size(20.0, 10.0).unwrap(), &StyleSpec::new())
            .unwrap();
        let group = f
            .new_group("Row", Rect::from_size(100.0, 10.0).unwrap(), vec![label.into()])
            .unwrap();
        artboard.push_layer(group.into());
        let page = f.new_page("Page 1", vec![artboard.into()]).unwrap();
        let document = f.new_document(vec![page]).unwrap();

        let ids = document.object_ids();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.iter().all(|id| is_canonical_object_id(&id.to_string())));
    }

    #[test]
    fn test_document_serialization_shape() {
        let mut f = factory();
        let artboard = f.new_artboard("Screen", 100.0, 100.0, Color::WHITE).unwrap();
        let artboard_id = artboard.base.id;
        let page = f.new_page("Page 1", vec![artboard.into()]).unwrap();
        let page_id = page.id();
        let document = f.new_document(vec![page]).unwrap();

        let manifest = serde_json::to_value(document.manifest()).unwrap();
        assert_eq!(manifest["_class"], "document");
        assert_eq!(manifest["pages"][0]["_class"], "MSJSONFileReference");
        assert_eq!(manifest["pages"][0]["_ref_class"], "MSImmutablePage");
        assert_eq!(manifest["pages"][0]["_ref"], format!("pages/{page_id}"));
        assert_eq!(manifest["assets"]["colorAssets"], serde_json::json!([]));
        assert_eq!(manifest["layerStyles"]["_class"], "sharedStyleContainer");

        let meta = serde_json::to_value(document.meta()).unwrap();
        let entry = &meta["pagesAndArtboards"][page_id.to_string()];
        assert_eq!(entry["name"], "Page 1");
        assert_eq!(entry["artboards"][artboard_id.to_string()]["name"], "Screen");

        let user = serde_json::to_value(document.user()).unwrap();
        assert_eq!(user[page_id.to_string()]["zoomValue"], 1.0);
    }

    #[test]
    fn test_document_json_round_trip() {
        let mut f = factory();
        let mut artboard = f.new_artboard("Screen", 100.0, 100.0, Color::WHITE).unwrap();
        let card = f
            .new_rectangle(
                Rect::new(8.0, 8.0, 84.0, 40.0).unwrap(),
                &StyleSpec::fill(Color::WHITE)
                    .with_corner_radius(6.0)
                    .with_border(Color::BLACK, 1.0, crate::BorderPosition::Inside),
                "Card",
            )
            .unwrap();
        artboard.push_layer(card.into());
        let page = f.new_page("Page 1", vec![artboard.into()]).unwrap();
        let document = f.new_document(vec![page]).unwrap();

        let json = serde_json::to_string(&document).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, document);

        let rebuilt = Document::from_parts(document.manifest(), document.pages.clone());
        assert_eq!(rebuilt, document);
    }
}

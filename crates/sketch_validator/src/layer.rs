//! Rules for layers, dispatched on [`LayerClass`]

use crate::checker::{as_integer, i8_code, join, u8_code, Checker, Object};
use crate::style::{font_of, rect, style};
use crate::ViolationKind;
use serde_json::Value;
use sketch_model::{
    utf16_len, BooleanOperation, ClippingMaskMode, CornerStyle, CurveMode, LayerClass,
    LayerListExpandedType, LineSpacingBehaviour, PointRadiusBehaviour, ResizingType,
    TextBehaviour,
};

/// Group layout classes the format accepts
const GROUP_LAYOUT_CLASSES: [&str; 2] = [
    "MSImmutableFreeformGroupLayout",
    "MSImmutableInferredGroupLayout",
];

/// Frames within this distance count as covering the artboard
const BACKGROUND_TOLERANCE: f64 = 0.5;

/// Where a layer sits; artboards and symbol masters only live on pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Page,
    Container,
}

/// Validate any layer value, dispatching on its `_class`
pub(crate) fn layer(c: &mut Checker, value: &Value, path: &str, slot: Slot) {
    let Some(obj) = c.object(value, path) else {
        return;
    };
    let Some(tag) = c.class(obj, path) else {
        return;
    };
    let Some(class) = LayerClass::from_tag(tag) else {
        c.violation(
            &join(path, "_class"),
            ViolationKind::UnknownClass,
            format!("`{tag}` is not a layer class"),
        );
        return;
    };

    if slot == Slot::Container && matches!(class, LayerClass::Artboard | LayerClass::SymbolMaster) {
        c.violation(
            &join(path, "_class"),
            ViolationKind::UnexpectedClass,
            format!("`{class}` must be a direct child of a page"),
        );
    }

    match class {
        LayerClass::Rectangle => rectangle(c, obj, path),
        LayerClass::Text => text(c, obj, path),
        LayerClass::Group | LayerClass::ShapeGroup => group(c, obj, path),
        LayerClass::Artboard => artboard(c, obj, path),
        LayerClass::Oval
        | LayerClass::ShapePath
        | LayerClass::Bitmap
        | LayerClass::SymbolInstance
        | LayerClass::SymbolMaster
        | LayerClass::Slice
        | LayerClass::Star
        | LayerClass::Polygon
        | LayerClass::Triangle
        | LayerClass::Hotspot => {
            base(c, obj, path);
            c.mark_unchecked(path);
            if class.is_container() {
                children(c, obj, path, Slot::Container);
            }
        }
    }
}

/// Validate the `layers` array; returns it when present
pub(crate) fn children<'v>(c: &mut Checker, obj: &'v Object, path: &str, slot: Slot) -> Option<&'v Vec<Value>> {
    let layers = c.array_field(obj, path, "layers")?;
    let layers_path = join(path, "layers");
    for (i, child) in layers.iter().enumerate() {
        layer(c, child, &join(&layers_path, i), slot);
    }
    Some(layers)
}

// =============================================================================
// Shared Base
// =============================================================================

fn export_format(c: &mut Checker, obj: &Object, path: &str) {
    c.number_field(obj, path, "absoluteSize");
    c.string_field(obj, path, "fileFormat");
    c.string_field(obj, path, "name");
    c.integer_field(obj, path, "namingScheme");
    c.number_field(obj, path, "scale");
    c.integer_field(obj, path, "visibleScaleType");
}

fn export_options(c: &mut Checker, obj: &Object, path: &str) {
    c.list(obj, path, "exportFormats", "exportFormat", export_format);
    if let Some(ids) = c.array_field(obj, path, "includedLayerIds") {
        let ids_path = join(path, "includedLayerIds");
        for (i, id) in ids.iter().enumerate() {
            if !id.is_string() {
                c.violation(&join(&ids_path, i), ViolationKind::WrongType, "layer ID must be a string");
            }
        }
    }
    c.integer_field(obj, path, "layerOptions");
    c.bool_field(obj, path, "shouldTrim");
}

pub(crate) fn ruler_data(c: &mut Checker, obj: &Object, path: &str) {
    c.number_field(obj, path, "base");
    c.number_array_field(obj, path, "guides");
}

pub(crate) fn group_layout(c: &mut Checker, obj: &Object, path: &str) {
    let Some(layout) = c.object_field(obj, path, "groupLayout") else {
        return;
    };
    let layout_path = join(path, "groupLayout");
    if let Some(class) = c.class(layout, &layout_path) {
        if !GROUP_LAYOUT_CLASSES.contains(&class) {
            c.violation(
                &join(&layout_path, "_class"),
                ViolationKind::UnexpectedClass,
                format!("`{class}` is not a group layout"),
            );
        }
    }
}

/// Fields every layer (and page) carries
pub(crate) fn base(c: &mut Checker, obj: &Object, path: &str) {
    c.object_id(obj, path);
    c.string_field(obj, path, "name");
    c.code_field(obj, path, "booleanOperation", i8_code(BooleanOperation::from_code));
    c.nested(obj, path, "exportOptions", "exportOptions", export_options);
    c.nested(obj, path, "frame", "rect", rect);
    for key in [
        "isFixedToViewport",
        "isFlippedHorizontal",
        "isFlippedVertical",
        "isLocked",
        "isVisible",
        "nameIsFixed",
        "shouldBreakMaskChain",
        "hasClippingMask",
    ] {
        c.bool_field(obj, path, key);
    }
    c.code_field(
        obj,
        path,
        "layerListExpandedType",
        u8_code(LayerListExpandedType::from_code),
    );
    c.integer_field(obj, path, "resizingConstraint");
    c.code_field(obj, path, "resizingType", u8_code(ResizingType::from_code));
    c.number_field(obj, path, "rotation");
    c.code_field(obj, path, "clippingMaskMode", u8_code(ClippingMaskMode::from_code));
    c.nested(obj, path, "style", "style", style);
}

// =============================================================================
// Rectangle
// =============================================================================

fn curve_point(c: &mut Checker, obj: &Object, path: &str) {
    c.number_field(obj, path, "cornerRadius");
    c.code_field(obj, path, "cornerStyle", u8_code(CornerStyle::from_code));
    c.code_field(obj, path, "curveMode", u8_code(CurveMode::from_code));
    c.point_field(obj, path, "curveFrom");
    c.point_field(obj, path, "curveTo");
    c.point_field(obj, path, "point");
    c.bool_field(obj, path, "hasCurveFrom");
    c.bool_field(obj, path, "hasCurveTo");
}

fn rectangle(c: &mut Checker, obj: &Object, path: &str) {
    base(c, obj, path);
    for key in [
        "edited",
        "isClosed",
        "hasConvertedToNewRoundCorners",
        "needsConvertionToNewRoundCorners",
    ] {
        c.bool_field(obj, path, key);
    }
    c.code_field(
        obj,
        path,
        "pointRadiusBehaviour",
        i8_code(PointRadiusBehaviour::from_code),
    );
    c.number_field(obj, path, "fixedRadius");

    c.list(obj, path, "points", "curvePoint", curve_point);
    if let Some(points) = obj.get("points").and_then(Value::as_array) {
        if points.len() != 4 {
            c.violation(
                &join(path, "points"),
                ViolationKind::Cardinality,
                format!("rectangle needs 4 points, found {}", points.len()),
            );
        }
    }
}

// =============================================================================
// Text
// =============================================================================

fn string_attribute(c: &mut Checker, obj: &Object, path: &str) {
    c.integer_field(obj, path, "location");
    c.integer_field(obj, path, "length");
    if let Some(attributes) = c.object_field(obj, path, "attributes") {
        crate::style::text_attributes(c, attributes, &join(path, "attributes"));
    }
}

fn attributed_string(c: &mut Checker, obj: &Object, path: &str) {
    c.string_field(obj, path, "string");
    c.list(obj, path, "attributes", "stringAttribute", string_attribute);
}

/// Spans must tile `[0, utf16_len)` in order without gaps or overlap
fn check_span_coverage(c: &mut Checker, content: &str, spans: &[Value], path: &str) {
    let total = utf16_len(content) as i64;
    if spans.is_empty() {
        if total > 0 {
            c.violation(path, ViolationKind::AttributeRange, "text has no attribute spans");
        }
        return;
    }

    let mut expected = 0i64;
    for (i, span) in spans.iter().enumerate() {
        let location = span.get("location").and_then(as_integer);
        let length = span.get("length").and_then(as_integer);
        let (Some(location), Some(length)) = (location, length) else {
            // Already reported by the span rule
            return;
        };
        let Some(end) = location.checked_add(length) else {
            c.violation(
                &join(path, i),
                ViolationKind::AttributeRange,
                format!("span at {location} with length {length} overflows"),
            );
            return;
        };
        if location != expected || length < 0 {
            c.violation(
                &join(path, i),
                ViolationKind::AttributeRange,
                format!("span [{location}, {end}) does not continue at {expected}"),
            );
            return;
        }
        expected = end;
    }

    if expected != total {
        c.violation(
            path,
            ViolationKind::AttributeRange,
            format!("spans cover {expected} of {total} UTF-16 units"),
        );
    }
}

/// The style-level font must equal the derivation of the first span's font
fn check_font_agreement(c: &mut Checker, obj: &Object, content: &str, spans: &[Value], path: &str) {
    let Some(span_font) = spans
        .first()
        .and_then(|span| span.get("attributes"))
        .and_then(Value::as_object)
        .and_then(font_of)
    else {
        return;
    };

    let style_path = join(path, "style");
    let text_style = obj.get("style").and_then(|style| style.get("textStyle"));
    let Some(text_style) = text_style.filter(|v| !v.is_null()) else {
        c.violation(
            &join(&style_path, "textStyle"),
            ViolationKind::MissingField,
            "text layer style has no textStyle",
        );
        return;
    };
    let Some(style_font) = text_style
        .get("encodedAttributes")
        .and_then(Value::as_object)
        .and_then(font_of)
    else {
        return;
    };

    let expected = span_font.derive_style_font(content);
    if style_font != expected {
        c.violation(
            &join(&style_path, "textStyle"),
            ViolationKind::FontMismatch,
            format!(
                "style font {} {} should be {} {} for span font {} {}",
                style_font.family,
                style_font.size,
                expected.family,
                expected.size,
                span_font.family,
                span_font.size
            ),
        );
    }
}

fn text(c: &mut Checker, obj: &Object, path: &str) {
    base(c, obj, path);
    c.nested(obj, path, "attributedString", "attributedString", attributed_string);
    c.bool_field(obj, path, "automaticallyDrawOnUnderlyingPath");
    c.bool_field(obj, path, "dontSynchroniseWithSymbol");
    c.string_field(obj, path, "glyphBounds");
    c.code_field(
        obj,
        path,
        "lineSpacingBehaviour",
        u8_code(LineSpacingBehaviour::from_code),
    );
    c.code_field(obj, path, "textBehaviour", u8_code(TextBehaviour::from_code));

    let attributed = obj.get("attributedString");
    let content = attributed.and_then(|a| a.get("string")).and_then(Value::as_str);
    let spans = attributed.and_then(|a| a.get("attributes")).and_then(Value::as_array);
    if let (Some(content), Some(spans)) = (content, spans) {
        let spans_path = join(&join(path, "attributedString"), "attributes");
        check_span_coverage(c, content, spans, &spans_path);
        check_font_agreement(c, obj, content, spans, path);
    }
}

// =============================================================================
// Containers
// =============================================================================

fn group(c: &mut Checker, obj: &Object, path: &str) {
    base(c, obj, path);
    c.bool_field(obj, path, "hasClickThrough");
    group_layout(c, obj, path);
    children(c, obj, path, Slot::Container);
}

fn frame_of(layer: &Object) -> Option<[f64; 4]> {
    let frame = layer.get("frame")?;
    let get = |key: &str| frame.get(key).and_then(Value::as_f64);
    Some([get("x")?, get("y")?, get("width")?, get("height")?])
}

/// First child must be a rectangle or shape group covering the artboard
/// frame with at least one enabled fill
fn check_background(c: &mut Checker, obj: &Object, first: &Value, path: &str) {
    let child_path = join(&join(path, "layers"), 0);
    let Some(first) = first.as_object() else {
        return;
    };

    let class = first.get("_class").and_then(Value::as_str).unwrap_or_default();
    if class != LayerClass::Rectangle.tag() && class != LayerClass::ShapeGroup.tag() {
        c.violation(
            &child_path,
            ViolationKind::MissingBackground,
            format!("first child is `{class}`, not a background shape"),
        );
        return;
    }

    if let (Some([x, y, width, height]), Some([_, _, board_width, board_height])) =
        (frame_of(first), frame_of(obj))
    {
        let covers = x.abs() <= BACKGROUND_TOLERANCE
            && y.abs() <= BACKGROUND_TOLERANCE
            && (width - board_width).abs() <= BACKGROUND_TOLERANCE
            && (height - board_height).abs() <= BACKGROUND_TOLERANCE;
        if !covers {
            c.violation(
                &child_path,
                ViolationKind::MissingBackground,
                format!(
                    "background frame ({x}, {y}, {width}, {height}) does not cover {board_width}x{board_height}"
                ),
            );
            return;
        }
    }

    let filled = first
        .get("style")
        .and_then(|s| s.get("fills"))
        .and_then(Value::as_array)
        .is_some_and(|fills| {
            fills
                .iter()
                .any(|fill| fill.get("isEnabled").and_then(Value::as_bool) == Some(true))
        });
    if !filled {
        c.violation(&child_path, ViolationKind::MissingBackground, "background has no enabled fill");
    }
}

fn artboard(c: &mut Checker, obj: &Object, path: &str) {
    base(c, obj, path);
    c.nested(obj, path, "backgroundColor", "color", crate::style::color);
    for key in [
        "hasBackgroundColor",
        "includeBackgroundColorInExport",
        "hasClickThrough",
        "isFlowHome",
        "resizesContent",
        "includeInCloudUpload",
    ] {
        c.bool_field(obj, path, key);
    }
    group_layout(c, obj, path);
    c.nested(obj, path, "horizontalRulerData", "rulerData", ruler_data);
    c.nested(obj, path, "verticalRulerData", "rulerData", ruler_data);

    if let Some(layers) = children(c, obj, path, Slot::Container) {
        match layers.first() {
            Some(first) => check_background(c, obj, first, path),
            None => c.violation(
                &join(path, "layers"),
                ViolationKind::Cardinality,
                "artboard has no layers; the background rectangle is required",
            ),
        }
    }
}

//! Rules for styles and their substructures

use crate::checker::{join, u8_code, Checker, Object};
use sketch_model::{
    BlendMode, BlurType, BorderPosition, FillType, FontChoice, GradientType, LineCapStyle,
    LineJoinStyle, MarkerType, TextAlignment, TextVerticalAlignment, WindingRule,
};

pub(crate) fn color(c: &mut Checker, obj: &Object, path: &str) {
    for channel in ["alpha", "blue", "green", "red"] {
        c.unit_field(obj, path, channel);
    }
}

pub(crate) fn rect(c: &mut Checker, obj: &Object, path: &str) {
    c.bool_field(obj, path, "constrainProportions");
    for key in ["height", "width", "x", "y"] {
        c.number_field(obj, path, key);
    }
}

fn context_settings(c: &mut Checker, obj: &Object, path: &str) {
    c.code_field(obj, path, "blendMode", u8_code(BlendMode::from_code));
    c.number_field(obj, path, "opacity");
}

fn gradient_stop(c: &mut Checker, obj: &Object, path: &str) {
    c.nested(obj, path, "color", "color", color);
    c.number_field(obj, path, "position");
}

fn gradient(c: &mut Checker, obj: &Object, path: &str) {
    c.number_field(obj, path, "elipseLength");
    c.point_field(obj, path, "from");
    c.point_field(obj, path, "to");
    c.code_field(obj, path, "gradientType", u8_code(GradientType::from_code));
    c.list(obj, path, "stops", "gradientStop", gradient_stop);
}

/// Fields common to fills and borders
fn paint(c: &mut Checker, obj: &Object, path: &str) {
    c.bool_field(obj, path, "isEnabled");
    c.code_field(obj, path, "fillType", u8_code(FillType::from_code));
    c.nested(obj, path, "color", "color", color);
    c.nested(obj, path, "contextSettings", "graphicsContextSettings", context_settings);
    c.nested(obj, path, "gradient", "gradient", gradient);
}

fn fill(c: &mut Checker, obj: &Object, path: &str) {
    paint(c, obj, path);
    for key in ["noiseIndex", "noiseIntensity", "patternFillType", "patternTileScale"] {
        c.number_field(obj, path, key);
    }
}

fn border(c: &mut Checker, obj: &Object, path: &str) {
    paint(c, obj, path);
    c.code_field(obj, path, "position", u8_code(BorderPosition::from_code));
    c.number_field(obj, path, "thickness");
}

/// Shared by `shadow` and `innerShadow`
fn shadow(c: &mut Checker, obj: &Object, path: &str) {
    c.bool_field(obj, path, "isEnabled");
    c.nested(obj, path, "color", "color", color);
    c.nested(obj, path, "contextSettings", "graphicsContextSettings", context_settings);
    for key in ["blurRadius", "offsetX", "offsetY", "spread"] {
        c.number_field(obj, path, key);
    }
}

fn blur(c: &mut Checker, obj: &Object, path: &str) {
    c.bool_field(obj, path, "isEnabled");
    c.point_field(obj, path, "center");
    c.number_field(obj, path, "motionAngle");
    c.number_field(obj, path, "radius");
    c.number_field(obj, path, "saturation");
    c.code_field(obj, path, "type", u8_code(BlurType::from_code));
}

fn border_options(c: &mut Checker, obj: &Object, path: &str) {
    c.bool_field(obj, path, "isEnabled");
    c.number_array_field(obj, path, "dashPattern");
    c.code_field(obj, path, "lineCapStyle", u8_code(LineCapStyle::from_code));
    c.code_field(obj, path, "lineJoinStyle", u8_code(LineJoinStyle::from_code));
}

fn color_controls(c: &mut Checker, obj: &Object, path: &str) {
    c.bool_field(obj, path, "isEnabled");
    for key in ["brightness", "contrast", "hue", "saturation"] {
        c.number_field(obj, path, key);
    }
}

fn font_descriptor(c: &mut Checker, obj: &Object, path: &str) {
    if let Some(attributes) = c.object_field(obj, path, "attributes") {
        let attributes_path = join(path, "attributes");
        c.string_field(attributes, &attributes_path, "name");
        c.number_field(attributes, &attributes_path, "size");
    }
}

fn paragraph_style(c: &mut Checker, obj: &Object, path: &str) {
    c.code_field(obj, path, "alignment", u8_code(TextAlignment::from_code));
    c.optional_number_field(obj, path, "maximumLineHeight");
    c.optional_number_field(obj, path, "minimumLineHeight");
}

/// Attribute dictionary of a text span or text-style block
pub(crate) fn text_attributes(c: &mut Checker, obj: &Object, path: &str) {
    c.nested(obj, path, "MSAttributedStringFontAttribute", "fontDescriptor", font_descriptor);
    c.nested(obj, path, "MSAttributedStringColorAttribute", "color", color);
    c.optional_nested(obj, path, "paragraphStyle", "paragraphStyle", paragraph_style);
    if obj.contains_key("textStyleVerticalAlignmentKey") {
        c.code_field(
            obj,
            path,
            "textStyleVerticalAlignmentKey",
            u8_code(TextVerticalAlignment::from_code),
        );
    }
    c.optional_number_field(obj, path, "kerning");
}

fn text_style(c: &mut Checker, obj: &Object, path: &str) {
    if let Some(attributes) = c.object_field(obj, path, "encodedAttributes") {
        text_attributes(c, attributes, &join(path, "encodedAttributes"));
    }
    c.code_field(obj, path, "verticalAlignment", u8_code(TextVerticalAlignment::from_code));
}

pub(crate) fn style(c: &mut Checker, obj: &Object, path: &str) {
    c.object_id(obj, path);
    c.code_field(obj, path, "startMarkerType", u8_code(MarkerType::from_code));
    c.code_field(obj, path, "endMarkerType", u8_code(MarkerType::from_code));
    c.number_field(obj, path, "miterLimit");
    c.code_field(obj, path, "windingRule", u8_code(WindingRule::from_code));

    c.nested(obj, path, "blur", "blur", blur);
    c.nested(obj, path, "borderOptions", "borderOptions", border_options);
    c.nested(obj, path, "colorControls", "colorControls", color_controls);
    c.nested(obj, path, "contextSettings", "graphicsContextSettings", context_settings);

    c.list(obj, path, "fills", "fill", fill);
    c.list(obj, path, "borders", "border", border);
    c.list(obj, path, "shadows", "shadow", shadow);
    c.list(obj, path, "innerShadows", "innerShadow", shadow);

    c.optional_nested(obj, path, "textStyle", "textStyle", text_style);
}

/// Font named by an attribute dictionary, if it is well formed
pub(crate) fn font_of(attributes: &Object) -> Option<FontChoice> {
    let descriptor = attributes.get("MSAttributedStringFontAttribute")?;
    let font = descriptor.get("attributes")?;
    Some(FontChoice::new(
        font.get("name")?.as_str()?,
        font.get("size")?.as_f64()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ViolationKind;
    use serde_json::{json, Value};

    fn run(rule: crate::checker::Rule, value: Value) -> crate::ValidationReport {
        let mut checker = Checker::new();
        let Value::Object(obj) = value else {
            unreachable!()
        };
        rule(&mut checker, &obj, "");
        checker.finish()
    }

    #[test]
    fn test_color_channel_out_of_range() {
        let report = run(color, json!({"alpha": 1, "blue": 0, "green": 0.5, "red": 1.2}));
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::OutOfRange);
        assert_eq!(report.violations[0].path, "/red");
    }

    #[test]
    fn test_font_of_reads_descriptor() {
        let attributes = json!({
            "MSAttributedStringFontAttribute": {
                "_class": "fontDescriptor",
                "attributes": {"name": "SFProText-Regular", "size": 14}
            }
        });
        let Value::Object(obj) = attributes else {
            unreachable!()
        };
        assert_eq!(font_of(&obj), Some(FontChoice::new("SFProText-Regular", 14.0)));
    }

    #[test]
    fn test_style_missing_blocks_all_reported() {
        let report = run(
            style,
            json!({
                "_class": "style",
                "do_objectID": "00000000-0000-4000-8000-000000000000",
                "startMarkerType": 0,
                "endMarkerType": 0,
                "miterLimit": 10,
                "windingRule": 1
            }),
        );
        let missing: Vec<_> = report
            .of_kind(ViolationKind::MissingField)
            .map(|v| v.path.as_str())
            .collect();
        for key in [
            "/blur",
            "/borderOptions",
            "/colorControls",
            "/contextSettings",
            "/fills",
            "/borders",
            "/shadows",
            "/innerShadows",
        ] {
            assert!(missing.contains(&key), "{key} not reported");
        }
        assert_eq!(report.violations.len(), 8);
    }
}

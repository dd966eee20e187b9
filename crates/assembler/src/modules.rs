//! Module builders and the dispatch table that selects them
//!
//! A builder returns the content layers of one module in module-local
//! coordinates; the assembler wraps them in a group positioned on the
//! artboard. Optional inputs that are absent or empty simply produce no
//! layer.

use crate::{Colors, ModuleSpec, Result, Typography};
use rand::RngCore;
use sketch_model::{
    BorderPosition, Color, Layer, NodeFactory, Rect, ShadowSpec, StyleSpec, TextAlignment,
};

pub const LIST_ROW_HEIGHT: f64 = 56.0;
pub const TABLE_ROW_HEIGHT: f64 = 40.0;
pub const PLACEHOLDER_HEIGHT: f64 = 60.0;

const BUTTON_HEIGHT: f64 = 44.0;
const BUTTON_GAP: f64 = 12.0;
const CARD_RADIUS: f64 = 12.0;
const CARD_INSET: f64 = 16.0;
const TAB_ICON_SIZE: f64 = 24.0;

/// Shared state handed to every builder
pub struct ModuleContext<'a, R: RngCore> {
    pub factory: &'a mut NodeFactory<R>,
    pub colors: &'a Colors,
    pub typography: &'a Typography,
    /// Module width (the artboard width)
    pub width: f64,
    pub height: f64,
    /// Horizontal content inset
    pub padding: f64,
}

pub type ModuleBuilder<R> = fn(&mut ModuleContext<'_, R>, &ModuleSpec) -> Result<Vec<Layer>>;

/// Line box height for a font size
pub fn line_height(size: f64) -> f64 {
    (size * 1.4).ceil()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl<R: RngCore> ModuleContext<'_, R> {
    fn inner_width(&self) -> f64 {
        (self.width - 2.0 * self.padding).max(1.0)
    }

    fn title_style(&self) -> StyleSpec {
        StyleSpec::new()
            .with_font(self.typography.title_family.clone(), self.typography.title_size)
            .with_text_color(self.colors.text_primary)
    }

    fn body_style(&self, color: Color) -> StyleSpec {
        StyleSpec::new()
            .with_font(self.typography.body_family.clone(), self.typography.body_size)
            .with_text_color(color)
    }

    fn caption_style(&self, color: Color) -> StyleSpec {
        StyleSpec::new()
            .with_font(self.typography.caption_family.clone(), self.typography.caption_size)
            .with_text_color(color)
    }

    fn text(&mut self, content: &str, frame: Rect, style: &StyleSpec) -> Result<Option<Layer>> {
        if content.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.factory.new_text(content, frame, style)?.into()))
    }

    fn rect(&mut self, name: &str, frame: Rect, style: &StyleSpec) -> Result<Layer> {
        Ok(self.factory.new_rectangle(frame, style, name)?.into())
    }

    /// Horizontal rule across the content area at `y`
    fn rule(&mut self, y: f64) -> Result<Layer> {
        let frame = Rect::new(self.padding, y, self.inner_width(), 1.0)?;
        let style = StyleSpec::fill(self.colors.divider);
        self.rect("Divider", frame, &style)
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Every registered module type with its builder
pub fn registry<R: RngCore>() -> [(&'static str, ModuleBuilder<R>); 10] {
    [
        ("header", header::<R>),
        ("search", search::<R>),
        ("tabs", tabs::<R>),
        ("list", list::<R>),
        ("card", card::<R>),
        ("table", table::<R>),
        ("buttons", buttons::<R>),
        ("text", text::<R>),
        ("divider", divider::<R>),
        ("tabbar", tabbar::<R>),
    ]
}

/// Builder registered for a module type
pub fn lookup<R: RngCore>(kind: &str) -> Option<ModuleBuilder<R>> {
    registry::<R>()
        .into_iter()
        .find(|(name, _)| *name == kind)
        .map(|(_, build)| build)
}

/// Height used when a module does not give one
pub fn default_height(spec: &ModuleSpec) -> f64 {
    match spec.kind.as_str() {
        "header" if non_empty(&spec.subtitle).is_some() => 72.0,
        "header" => 56.0,
        "search" => 52.0,
        "tabs" => 44.0,
        "list" => LIST_ROW_HEIGHT * spec.items.len().max(1) as f64,
        "card" => 120.0,
        "table" => TABLE_ROW_HEIGHT * (spec.rows.len() + 1) as f64,
        "buttons" => 64.0,
        "text" => 44.0,
        "divider" => 9.0,
        "tabbar" => 83.0,
        _ => PLACEHOLDER_HEIGHT,
    }
}

// =============================================================================
// Builders
// =============================================================================

fn header<R: RngCore>(ctx: &mut ModuleContext<'_, R>, spec: &ModuleSpec) -> Result<Vec<Layer>> {
    let title_height = line_height(ctx.typography.title_size);
    let subtitle = non_empty(&spec.subtitle);
    let subtitle_height = line_height(ctx.typography.caption_size);
    let block = title_height + subtitle.map_or(0.0, |_| subtitle_height);
    let top = ((ctx.height - block) / 2.0).max(0.0);

    let mut layers = Vec::new();
    if let Some(title) = non_empty(&spec.title) {
        let frame = Rect::new(ctx.padding, top, ctx.inner_width(), title_height)?;
        let style = ctx.title_style().with_alignment(TextAlignment::Center);
        layers.extend(ctx.text(title, frame, &style)?);
    }
    if let Some(subtitle) = subtitle {
        let frame = Rect::new(ctx.padding, top + title_height, ctx.inner_width(), subtitle_height)?;
        let style = ctx
            .caption_style(ctx.colors.text_secondary)
            .with_alignment(TextAlignment::Center);
        layers.extend(ctx.text(subtitle, frame, &style)?);
    }
    Ok(layers)
}

fn search<R: RngCore>(ctx: &mut ModuleContext<'_, R>, spec: &ModuleSpec) -> Result<Vec<Layer>> {
    let field_height = (ctx.height - 16.0).max(1.0);
    let field = Rect::new(ctx.padding, 8.0, ctx.inner_width(), field_height)?;
    let field_style = StyleSpec::fill(ctx.colors.input).with_corner_radius(field_height / 2.0);
    let mut layers = vec![ctx.rect("Search Field", field, &field_style)?];

    let placeholder = non_empty(&spec.content).unwrap_or("Search");
    let text_height = line_height(ctx.typography.body_size);
    let frame = Rect::new(
        ctx.padding + 12.0,
        ((ctx.height - text_height) / 2.0).max(0.0),
        (ctx.inner_width() - 24.0).max(1.0),
        text_height,
    )?;
    let style = ctx.body_style(ctx.colors.text_secondary);
    layers.extend(ctx.text(placeholder, frame, &style)?);
    Ok(layers)
}

fn tabs<R: RngCore>(ctx: &mut ModuleContext<'_, R>, spec: &ModuleSpec) -> Result<Vec<Layer>> {
    let mut layers = Vec::new();
    if spec.items.is_empty() {
        return Ok(layers);
    }
    let tab_width = ctx.inner_width() / spec.items.len() as f64;
    let text_height = line_height(ctx.typography.body_size);
    let top = ((ctx.height - text_height) / 2.0).max(0.0);

    for (i, item) in spec.items.iter().enumerate() {
        let color = if i == 0 { ctx.colors.primary } else { ctx.colors.text_secondary };
        let frame = Rect::new(ctx.padding + i as f64 * tab_width, top, tab_width, text_height)?;
        let style = ctx.body_style(color).with_alignment(TextAlignment::Center);
        layers.extend(ctx.text(item, frame, &style)?);
    }

    let indicator = Rect::new(ctx.padding, (ctx.height - 2.0).max(0.0), tab_width, 2.0)?;
    let style = StyleSpec::fill(ctx.colors.primary);
    layers.push(ctx.rect("Indicator", indicator, &style)?);
    Ok(layers)
}

fn list<R: RngCore>(ctx: &mut ModuleContext<'_, R>, spec: &ModuleSpec) -> Result<Vec<Layer>> {
    let mut layers = Vec::new();
    if spec.items.is_empty() {
        return Ok(layers);
    }
    let row_height = ctx.height / spec.items.len() as f64;
    let text_height = line_height(ctx.typography.body_size);

    for (i, item) in spec.items.iter().enumerate() {
        let row_top = i as f64 * row_height;
        let frame = Rect::new(
            ctx.padding,
            row_top + ((row_height - text_height) / 2.0).max(0.0),
            ctx.inner_width(),
            text_height,
        )?;
        let style = ctx.body_style(ctx.colors.text_primary);
        layers.extend(ctx.text(item, frame, &style)?);
        if i + 1 < spec.items.len() {
            layers.push(ctx.rule(row_top + row_height - 1.0)?);
        }
    }
    Ok(layers)
}

fn card<R: RngCore>(ctx: &mut ModuleContext<'_, R>, spec: &ModuleSpec) -> Result<Vec<Layer>> {
    let card_height = (ctx.height - 16.0).max(1.0);
    let frame = Rect::new(ctx.padding, 8.0, ctx.inner_width(), card_height)?;
    let style = StyleSpec::fill(ctx.colors.surface)
        .with_corner_radius(CARD_RADIUS)
        .with_shadow(ShadowSpec::default());
    let mut layers = vec![ctx.rect("Card", frame, &style)?];

    let x = ctx.padding + CARD_INSET;
    let width = (ctx.inner_width() - 2.0 * CARD_INSET).max(1.0);
    let mut y = 8.0 + CARD_INSET;

    if let Some(title) = non_empty(&spec.title) {
        let height = line_height(ctx.typography.title_size);
        let style = ctx.title_style();
        layers.extend(ctx.text(title, Rect::new(x, y, width, height)?, &style)?);
        y += height + 4.0;
    }
    if let Some(subtitle) = non_empty(&spec.subtitle) {
        let height = line_height(ctx.typography.caption_size);
        let style = ctx.caption_style(ctx.colors.text_secondary);
        layers.extend(ctx.text(subtitle, Rect::new(x, y, width, height)?, &style)?);
        y += height + 4.0;
    }
    if let Some(content) = non_empty(&spec.content) {
        let height = (8.0 + card_height - CARD_INSET - y).max(line_height(ctx.typography.body_size));
        let style = ctx.body_style(ctx.colors.text_primary);
        layers.extend(ctx.text(content, Rect::new(x, y, width, height)?, &style)?);
    }
    Ok(layers)
}

fn table<R: RngCore>(ctx: &mut ModuleContext<'_, R>, spec: &ModuleSpec) -> Result<Vec<Layer>> {
    let column_count = spec
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(spec.columns.len()))
        .max()
        .unwrap_or(0);
    let mut layers = Vec::new();
    if column_count == 0 {
        return Ok(layers);
    }

    let column_width = ctx.inner_width() / column_count as f64;
    let row_height = ctx.height / (spec.rows.len() + 1) as f64;
    let text_height = line_height(ctx.typography.caption_size).min(row_height);
    let inset = ((row_height - text_height) / 2.0).max(0.0);

    let header = Rect::new(0.0, 0.0, ctx.width, row_height)?;
    let style = StyleSpec::fill(ctx.colors.input);
    layers.push(ctx.rect("Header Row", header, &style)?);

    for (c, column) in spec.columns.iter().enumerate() {
        let frame = Rect::new(
            ctx.padding + c as f64 * column_width,
            inset,
            column_width,
            text_height,
        )?;
        let style = ctx.caption_style(ctx.colors.text_secondary);
        layers.extend(ctx.text(column, frame, &style)?);
    }

    for (r, row) in spec.rows.iter().enumerate() {
        let row_top = (r + 1) as f64 * row_height;
        for (c, cell) in row.iter().enumerate() {
            let frame = Rect::new(
                ctx.padding + c as f64 * column_width,
                row_top + inset,
                column_width,
                text_height,
            )?;
            let style = ctx.caption_style(ctx.colors.text_primary);
            layers.extend(ctx.text(cell, frame, &style)?);
        }
        layers.push(ctx.rule(row_top + row_height - 1.0)?);
    }
    Ok(layers)
}

fn buttons<R: RngCore>(ctx: &mut ModuleContext<'_, R>, spec: &ModuleSpec) -> Result<Vec<Layer>> {
    let mut layers = Vec::new();
    if spec.buttons.is_empty() {
        return Ok(layers);
    }
    let count = spec.buttons.len() as f64;
    let width = ((ctx.inner_width() - BUTTON_GAP * (count - 1.0)) / count).max(1.0);
    let height = BUTTON_HEIGHT.min((ctx.height - 8.0).max(1.0));
    let top = ((ctx.height - height) / 2.0).max(0.0);
    let text_height = line_height(ctx.typography.body_size).min(height);

    for (i, label) in spec.buttons.iter().enumerate() {
        let x = ctx.padding + i as f64 * (width + BUTTON_GAP);
        let primary = i == 0;

        let shape_style = if primary {
            StyleSpec::fill(ctx.colors.primary)
        } else {
            StyleSpec::fill(ctx.colors.surface).with_border(
                ctx.colors.primary,
                1.0,
                BorderPosition::Inside,
            )
        };
        let shape_style = shape_style.with_corner_radius(8.0);
        let shape = ctx.factory.new_rectangle(Rect::from_size(width, height)?, &shape_style, "Shape")?;
        let name = if label.is_empty() { "Button" } else { label.as_str() };
        let button = ctx.factory.new_shape_group(
            name,
            Rect::new(x, top, width, height)?,
            vec![shape.into()],
        )?;
        layers.push(button.into());

        let color = if primary { ctx.colors.on_primary } else { ctx.colors.primary };
        let frame = Rect::new(x, top + (height - text_height) / 2.0, width, text_height)?;
        let style = ctx.body_style(color).with_alignment(TextAlignment::Center);
        layers.extend(ctx.text(label, frame, &style)?);
    }
    Ok(layers)
}

fn text<R: RngCore>(ctx: &mut ModuleContext<'_, R>, spec: &ModuleSpec) -> Result<Vec<Layer>> {
    let Some(content) = non_empty(&spec.content).or(non_empty(&spec.title)) else {
        return Ok(Vec::new());
    };
    let frame = Rect::new(ctx.padding, 8.0, ctx.inner_width(), (ctx.height - 16.0).max(1.0))?;
    let style = ctx.body_style(ctx.colors.text_primary);
    Ok(ctx.text(content, frame, &style)?.into_iter().collect())
}

fn divider<R: RngCore>(ctx: &mut ModuleContext<'_, R>, _: &ModuleSpec) -> Result<Vec<Layer>> {
    let y = ((ctx.height - 1.0) / 2.0).max(0.0);
    Ok(vec![ctx.rule(y)?])
}

fn tabbar<R: RngCore>(ctx: &mut ModuleContext<'_, R>, spec: &ModuleSpec) -> Result<Vec<Layer>> {
    let top_rule = Rect::new(0.0, 0.0, ctx.width, 1.0)?;
    let style = StyleSpec::fill(ctx.colors.divider);
    let mut layers = vec![ctx.rect("Divider", top_rule, &style)?];
    if spec.items.is_empty() {
        return Ok(layers);
    }

    let slot = ctx.width / spec.items.len() as f64;
    let label_height = line_height(ctx.typography.caption_size);
    for (i, item) in spec.items.iter().enumerate() {
        let color = if i == 0 { ctx.colors.primary } else { ctx.colors.text_secondary };
        let x = i as f64 * slot;

        let icon = Rect::new(x + (slot - TAB_ICON_SIZE) / 2.0, 7.0, TAB_ICON_SIZE, TAB_ICON_SIZE)?;
        let style = StyleSpec::fill(color).with_corner_radius(6.0);
        layers.push(ctx.rect("Icon", icon, &style)?);

        let frame = Rect::new(x, 7.0 + TAB_ICON_SIZE + 3.0, slot, label_height)?;
        let style = ctx.caption_style(color).with_alignment(TextAlignment::Center);
        layers.extend(ctx.text(item, frame, &style)?);
    }
    Ok(layers)
}

/// Stand-in for a module type with no registered builder
pub fn placeholder<R: RngCore>(ctx: &mut ModuleContext<'_, R>, spec: &ModuleSpec) -> Result<Vec<Layer>> {
    let frame = Rect::new(ctx.padding, 4.0, ctx.inner_width(), (ctx.height - 8.0).max(1.0))?;
    let style = StyleSpec::fill(ctx.colors.placeholder)
        .with_corner_radius(4.0)
        .with_border(ctx.colors.text_secondary, 1.0, BorderPosition::Inside);
    let mut layers = vec![ctx.rect("Placeholder", frame, &style)?];

    let label = if spec.kind.is_empty() {
        "Unknown module".to_string()
    } else {
        format!("Unknown module: {}", spec.kind)
    };
    let text_height = line_height(ctx.typography.caption_size).min(frame.height);
    let label_frame = Rect::new(
        ctx.padding,
        frame.y + (frame.height - text_height) / 2.0,
        ctx.inner_width(),
        text_height,
    )?;
    let style = ctx
        .caption_style(ctx.colors.text_secondary)
        .with_alignment(TextAlignment::Center);
    layers.extend(ctx.text(&label, label_frame, &style)?);
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Palette;
    use rand::rngs::StdRng;

    fn build(spec: &ModuleSpec, height: f64) -> Vec<Layer> {
        let mut factory = NodeFactory::seeded(7);
        let colors = Palette::default().resolve().unwrap();
        let typography = Typography::default();
        let mut ctx = ModuleContext {
            factory: &mut factory,
            colors: &colors,
            typography: &typography,
            width: 393.0,
            height,
            padding: 16.0,
        };
        let build = lookup::<StdRng>(&spec.kind).unwrap();
        build(&mut ctx, spec).unwrap()
    }

    #[test]
    fn test_registry_covers_module_types() {
        let kinds: Vec<_> = registry::<StdRng>().iter().map(|(kind, _)| *kind).collect();
        assert_eq!(
            kinds,
            vec!["header", "search", "tabs", "list", "card", "table", "buttons", "text", "divider", "tabbar"]
        );
        assert!(lookup::<StdRng>("carousel").is_none());
    }

    #[test]
    fn test_default_heights() {
        assert_eq!(default_height(&ModuleSpec::new("header")), 56.0);
        assert_eq!(
            default_height(&ModuleSpec::new("header").with_subtitle("Today")),
            72.0
        );
        assert_eq!(
            default_height(&ModuleSpec::new("list").with_items(["a", "b", "c"])),
            3.0 * LIST_ROW_HEIGHT
        );
        assert_eq!(default_height(&ModuleSpec::new("list")), LIST_ROW_HEIGHT);
        assert_eq!(default_height(&ModuleSpec::new("unknown")), PLACEHOLDER_HEIGHT);
    }

    #[test]
    fn test_list_rows_and_dividers() {
        let spec = ModuleSpec::new("list").with_items(["One", "Two", "Three"]);
        let layers = build(&spec, 3.0 * LIST_ROW_HEIGHT);
        let texts = layers.iter().filter(|l| matches!(l, Layer::Text(_))).count();
        let rules = layers.iter().filter(|l| l.name() == "Divider").count();
        assert_eq!(texts, 3);
        assert_eq!(rules, 2);
    }

    #[test]
    fn test_empty_optional_fields_omit_layers() {
        assert!(build(&ModuleSpec::new("list"), 56.0).is_empty());
        assert!(build(&ModuleSpec::new("text"), 44.0).is_empty());
        assert!(build(&ModuleSpec::new("header").with_title(""), 56.0).is_empty());
    }

    #[test]
    fn test_table_uses_widest_row() {
        let spec = ModuleSpec {
            kind: "table".to_string(),
            columns: vec!["Item".to_string()],
            rows: vec![vec!["A".to_string(), "1".to_string(), "x".to_string()]],
            ..Default::default()
        };
        let layers = build(&spec, 80.0);
        let cell = layers
            .iter()
            .find(|l| matches!(l, Layer::Text(t) if t.content() == "x"))
            .unwrap();
        let column_width = (393.0 - 32.0) / 3.0;
        assert!((cell.frame().x - (16.0 + 2.0 * column_width)).abs() < 1e-9);
    }

    #[test]
    fn test_buttons_are_shape_groups() {
        let spec = ModuleSpec {
            kind: "buttons".to_string(),
            buttons: vec!["Pay".to_string(), "Cancel".to_string()],
            ..Default::default()
        };
        let layers = build(&spec, 64.0);
        let groups: Vec<_> = layers
            .iter()
            .filter(|l| matches!(l, Layer::ShapeGroup(_)))
            .collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name(), "Pay");
        assert_eq!(groups[0].children().len(), 1);
    }
}

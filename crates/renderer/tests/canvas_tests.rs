//! Rendering smoothed layers onto a tiny-skia canvas.

use kernel_smoothing::{
    BlendMode, Color, DrawOutcome, KernelSmoothingStyle, RenderContext, SmoothingConfig,
};
use renderer::{ColorRamp, ColorStop, PixmapCanvas, RampScale, SquareStyle};
use smoothing_common::{Cell, SmoothedCell, SmoothedLayer, ViewState};
use test_utils::{scenario_cells, scenario_view, SCENARIO_RESOLUTION, VALUE_FIELD};

fn solid(hex: &str) -> ColorRamp {
    ColorRamp::new(&[ColorStop::new(0.0, hex)]).unwrap()
}

#[test]
fn test_fill_rect_uses_geo_transform() {
    // 20 x 20 px view over (0,0)-(20,20), one unit per pixel, y up.
    let view = scenario_view();
    let mut canvas = PixmapCanvas::for_view(&view).unwrap();
    canvas.set_transform(&view.transform());
    canvas.fill_rect(0.0, 0.0, 5.0, 5.0, Color::new(0, 255, 0, 255));

    // Geographic (0..5, 0..5) is the bottom-left of the image.
    assert_eq!(canvas.pixel(2, 17), Some(Color::new(0, 255, 0, 255)));
    assert_eq!(canvas.pixel(2, 2).map(|c| c.a), Some(0));
}

#[test]
fn test_smoothed_scenario_renders_bottom_left_block() {
    let view = scenario_view();
    let config = SmoothingConfig::new(
        |c: &Cell| c.value(VALUE_FIELD).unwrap_or(0.0),
        |resolution, _zoom| resolution,
    )
    .with_style(SquareStyle::new("solid", solid("#0000FF")));
    let style = KernelSmoothingStyle::new(config).unwrap();
    let mut canvas = PixmapCanvas::for_view(&view).unwrap();

    let outcome = style
        .draw(&scenario_cells(), &view, SCENARIO_RESOLUTION, &mut canvas)
        .unwrap();
    assert!(matches!(outcome, DrawOutcome::Drawn { cells: 4, .. }));

    // The smoothed grid covers (0,0)-(10,10), the bottom-left quarter.
    assert_eq!(canvas.pixel(5, 15), Some(Color::new(0, 0, 255, 255)));
    assert_eq!(canvas.pixel(15, 5).map(|c| c.a), Some(0));
}

#[test]
fn test_alpha_style_is_translucent_and_restored() {
    let view = ViewState::from_center(1.0, 1.0, 1.0, 2, 2);
    let layer = SmoothedLayer::new(
        "ksmval",
        2.0,
        vec![SmoothedCell { x: 0.0, y: 0.0, value: 1.0 }],
    );
    let styles: Vec<Box<dyn kernel_smoothing::DelegateStyle>> = vec![Box::new(
        SquareStyle::new("half", solid("#FF0000"))
            .with_alpha(0.5)
            .with_blend(BlendMode::Normal),
    )];
    let mut canvas = PixmapCanvas::for_view(&view).unwrap();

    kernel_smoothing::composite(&layer, &styles, &view, &mut canvas).unwrap();

    let p = canvas.pixel(0, 0).unwrap();
    assert_eq!((p.r, p.g, p.b), (255, 0, 0));
    assert!(p.a > 120 && p.a < 135);
    assert_eq!(canvas.global_alpha(), 1.0);
}

#[test]
fn test_absolute_scale_colors() {
    let view = ViewState::from_center(2.0, 1.0, 1.0, 4, 2);
    let layer = SmoothedLayer::new(
        "ksmval",
        2.0,
        vec![
            SmoothedCell { x: 0.0, y: 0.0, value: 0.0 },
            SmoothedCell { x: 2.0, y: 0.0, value: 10.0 },
        ],
    );
    let ramp = ColorRamp::new(&[ColorStop::new(0.0, "#000000"), ColorStop::new(10.0, "#FFFFFF")])
        .unwrap();
    let styles: Vec<Box<dyn kernel_smoothing::DelegateStyle>> =
        vec![Box::new(SquareStyle::new("abs", ramp).with_scale(RampScale::Absolute))];
    let mut canvas = PixmapCanvas::for_view(&view).unwrap();

    kernel_smoothing::composite(&layer, &styles, &view, &mut canvas).unwrap();

    assert_eq!(canvas.pixel(0, 0), Some(Color::new(0, 0, 0, 255)));
    assert_eq!(canvas.pixel(3, 1), Some(Color::new(255, 255, 255, 255)));
}

#[test]
fn test_save_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");

    let mut canvas = PixmapCanvas::new(8, 8).unwrap();
    canvas.clear(Color::new(10, 20, 30, 255));
    canvas.save_png(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

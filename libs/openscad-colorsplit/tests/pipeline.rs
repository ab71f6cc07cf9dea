use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use openscad_colorsplit::{
    PipelineError, Pipeline, RenderError, Renderer, RunSummary, Settings, SettingsLayer,
    UnitStatus,
};
use openscad_palette::Palette;

// =============================================================================
// Fake Renderer
// =============================================================================

/// Emits one facet per active line mentioning `cube`, and fails when an
/// active line mentions `broken`.
#[derive(Default)]
struct FakeRenderer {
    calls: Mutex<Vec<PathBuf>>,
}

impl Renderer for FakeRenderer {
    fn render(&self, source: &Path, artifact: &Path) -> Result<(), RenderError> {
        self.calls.lock().unwrap().push(source.to_path_buf());
        let text = std::fs::read_to_string(source).unwrap();
        let active: Vec<&str> = text
            .lines()
            .filter(|line| !line.trim_start().starts_with("//"))
            .collect();

        if active.iter().any(|line| line.contains("broken")) {
            return Err(RenderError::Failed {
                code: Some(1),
                stderr: "ERROR: unknown module broken".to_string(),
            });
        }

        let mut stl = String::from("solid OpenSCAD_Model\n");
        for (i, _) in active.iter().filter(|line| line.contains("cube")).enumerate() {
            let z = i as f64;
            stl.push_str(&format!(
                "facet normal 0 0 1\nouter loop\nvertex 0 0 {z}\nvertex 1 0 {z}\nvertex 0 1 {z}\nendloop\nendfacet\n"
            ));
        }
        stl.push_str("endsolid OpenSCAD_Model\n");
        std::fs::write(artifact, stl).unwrap();
        Ok(())
    }
}

/// Finishes units in reverse discovery order: unit `n` waits until every
/// later unit is done, then emits `n + 1` facets.
struct ReverseRenderer {
    colors: usize,
    done: Mutex<Vec<usize>>,
    finished: Condvar,
}

impl ReverseRenderer {
    fn new(colors: usize) -> Self {
        Self {
            colors,
            done: Mutex::new(Vec::new()),
            finished: Condvar::new(),
        }
    }
}

impl Renderer for ReverseRenderer {
    fn render(&self, _source: &Path, artifact: &Path) -> Result<(), RenderError> {
        let name = artifact.file_name().unwrap().to_string_lossy().into_owned();
        let number: usize = name.split('_').next().unwrap().parse().unwrap();

        let done = self.done.lock().unwrap();
        let (mut done, _) = self
            .finished
            .wait_timeout_while(done, Duration::from_secs(10), |done| {
                !(number + 1..self.colors).all(|later| done.contains(&later))
            })
            .unwrap();

        let mut stl = String::from("solid OpenSCAD_Model\n");
        for _ in 0..=number {
            stl.push_str(
                "facet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\n",
            );
        }
        stl.push_str("endsolid OpenSCAD_Model\n");
        std::fs::write(artifact, stl).unwrap();

        done.push(number);
        self.finished.notify_all();
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

struct Run {
    dir: tempfile::TempDir,
    settings: Settings,
    summary: RunSummary,
    renders: usize,
}

impl Run {
    fn file(&self, name: &str) -> String {
        std::fs::read_to_string(self.settings.output_dir.join(name)).unwrap()
    }

    fn exists(&self, name: &str) -> bool {
        self.settings.output_dir.join(name).exists()
    }
}

fn layer() -> SettingsLayer {
    SettingsLayer {
        jobs: Some(2),
        ..SettingsLayer::default()
    }
}

fn run_with(source: &str, layer: SettingsLayer) -> Run {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("box.scad");
    std::fs::write(&input, source).unwrap();

    let settings = Settings::resolve(&input, &[layer]).unwrap();
    let renderer = FakeRenderer::default();
    let summary = Pipeline::new(&settings, &Palette::builtin(), &renderer)
        .run()
        .unwrap();
    let renders = renderer.calls.lock().unwrap().len();
    Run {
        dir,
        settings,
        summary,
        renders,
    }
}

fn run(source: &str) -> Run {
    run_with(source, layer())
}

fn faces(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|l| l.starts_with("f ") || l.starts_with("usemtl"))
        .collect()
}

// =============================================================================
// Output Layout
// =============================================================================

#[test]
fn source_without_groups_uses_main() {
    let run = run("color(\"red\") cube(1);\ncolor(\"blue\") {\n  cube(2);\n  cube(3);\n}\n");

    assert_eq!(run.renders, 2);
    assert_eq!(run.settings.output_dir, run.dir.path().join("ColorHelper_box"));
    for name in [
        "0_box_main_red.scad",
        "0_box_main_red.stl",
        "0_box_main_red.obj",
        "1_box_main_blue.scad",
        "1_box_main_blue.stl",
        "1_box_main_blue.obj",
        "box_main.obj",
        "box.mtl",
    ] {
        assert!(run.exists(name), "missing {name}");
    }

    assert_eq!(
        run.file("0_box_main_red.scad"),
        "color(\"red\") cube(1);\n//color(\"blue\") {\n//  cube(2);\n//  cube(3);\n//}\n"
    );
    assert_eq!(
        faces(&run.file("box_main.obj")),
        [
            "usemtl red",
            "f 1//1 2//1 3//1",
            "usemtl blue",
            "f 4//2 5//2 6//2",
            "f 7//3 8//3 9//3",
        ]
    );
    assert!(run.file("box_main.obj").starts_with("mtllib box.mtl\n"));
    assert_eq!(run.file("box.mtl"), "newmtl red\nKd 1 0 0\nnewmtl blue\nKd 0 0 1\n");
}

#[test]
fn every_group_gets_every_color() {
    let run = run(
        "color(\"red\") cube(1);\n\
         /*start_group(\"Lid\")*/\n\
         color(\"blue\") cube(2);\n\
         /*end_group(\"Lid\")*/\n",
    );

    assert_eq!(run.renders, 4);
    let groups: Vec<&str> = run.summary.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(groups, ["main", "lid"]);
    assert!(run.exists("box_main.obj"));
    assert!(run.exists("box_lid.obj"));
    assert!(run.exists("1_box_lid_blue.obj"));

    // materials are shared across groups
    assert_eq!(run.summary.materials, ["red", "blue"]);
}

#[test]
fn material_pattern_names_materials() {
    let run = run_with(
        "color([0.2, 0.4, 0.6]) cube(1);\n",
        SettingsLayer {
            material_pattern: Some("{input}_{number}_{color}".to_string()),
            ..layer()
        },
    );
    assert_eq!(
        run.file("box.mtl"),
        "newmtl box_0_rgb(0.2,0.4,0.6)\nKd 0.2 0.4 0.6\n"
    );
    assert!(run.file("box_main.obj").contains("usemtl box_0_rgb(0.2,0.4,0.6)\n"));
}

#[test]
fn property_overrides_reach_every_variant() {
    let run = run_with(
        "/*extern*/ label = \"none\";\ncolor(\"red\") cube(1);\n",
        SettingsLayer {
            properties: vec![("label".to_string(), "v\"2".to_string())],
            ..layer()
        },
    );
    assert!(run
        .file("0_box_main_red.scad")
        .starts_with("/* prop */label = \"v\\\"2\";\n"));
}

#[test]
fn out_of_order_renders_merge_in_discovery_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("box.scad");
    std::fs::write(
        &input,
        "color(\"red\") cube(1);\ncolor(\"green\") cube(2);\ncolor(\"blue\") cube(3);\n",
    )
    .unwrap();

    let layer = SettingsLayer {
        jobs: Some(3),
        ..SettingsLayer::default()
    };
    let settings = Settings::resolve(&input, &[layer]).unwrap();
    let renderer = ReverseRenderer::new(3);
    let summary = Pipeline::new(&settings, &Palette::builtin(), &renderer)
        .run()
        .unwrap();

    assert_eq!(*renderer.done.lock().unwrap(), [2, 1, 0]);

    let numbers: Vec<usize> = summary.units().map(|unit| unit.number).collect();
    assert_eq!(numbers, [0, 1, 2]);
    let colors: Vec<&str> = summary.units().map(|unit| unit.color.as_str()).collect();
    assert_eq!(colors, ["red", "green", "blue"]);
    let triangles: Vec<usize> = summary.units().map(|unit| unit.triangles).collect();
    assert_eq!(triangles, [1, 2, 3]);

    let merged = std::fs::read_to_string(settings.output_dir.join("box_main.obj")).unwrap();
    assert_eq!(
        faces(&merged),
        [
            "usemtl red",
            "f 1//1 2//1 3//1",
            "usemtl green",
            "f 4//2 5//2 6//2",
            "f 7//3 8//3 9//3",
            "usemtl blue",
            "f 10//4 11//4 12//4",
            "f 13//5 14//5 15//5",
            "f 16//6 17//6 18//6",
        ]
    );
    assert_eq!(summary.materials, ["red", "green", "blue"]);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn render_failure_keeps_numbering() {
    let run = run("color(\"green\") broken();\ncolor(\"red\") cube(1);\n");

    let units: Vec<_> = run.summary.units().collect();
    assert!(matches!(units[0].status, UnitStatus::RenderFailed { .. }));
    assert_eq!(units[0].triangles, 0);
    assert_eq!(units[1].status, UnitStatus::Rendered);
    assert_eq!(run.summary.failed_units(), 1);

    assert_eq!(run.file("0_box_main_green.stl"), "solid empty\nendsolid empty\n");
    assert_eq!(
        run.file("0_box_main_green.obj"),
        "mtllib box.mtl\nusemtl green\no empty\n"
    );
    assert_eq!(
        faces(&run.file("box_main.obj")),
        ["usemtl green", "usemtl red", "f 1//1 2//1 3//1"]
    );
    assert_eq!(run.file("box.mtl"), "newmtl red\nKd 1 0 0\n");

    let json = serde_json::to_value(&run.summary).unwrap();
    assert_eq!(json["groups"][0]["units"][0]["status"], "render_failed");
    assert_eq!(json["groups"][0]["units"][1]["number"], 1);
}

#[test]
fn unterminated_statement_skips_only_that_unit() {
    let run = run("color(\"red\") {\n  cube(1);\ncolor(\"blue\") cube(2);\n");

    let units: Vec<_> = run.summary.units().collect();
    assert_eq!(units[0].status, UnitStatus::Rendered);
    assert!(matches!(units[1].status, UnitStatus::Skipped { .. }));
    assert_eq!(run.renders, 1);
    assert!(!run.exists("1_box_main_blue.scad"));
    assert!(!run.exists("1_box_main_blue.obj"));
    assert!(run.exists("box_main.obj"));
}

#[test]
fn unknown_named_color_is_white() {
    let run = run("color(\"notacolor\") cube(1);\n");
    assert_eq!(run.file("box.mtl"), "newmtl notacolor\nKd 1 1 1\n");
}

#[test]
fn hex_color_is_byte_range() {
    let run = run("color(\"#FF0000\") cube(1);\n");
    assert_eq!(run.file("box.mtl"), "newmtl #ff0000\nKd 1 0 0\n");
}

#[test]
fn missing_input_is_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::resolve(dir.path().join("absent.scad"), &[layer()]).unwrap();
    let err = Pipeline::new(&settings, &Palette::builtin(), &FakeRenderer::default())
        .run()
        .unwrap_err();
    assert!(matches!(err, PipelineError::Source { .. }));
    assert_eq!(err.exit_code(), config::constants::EXIT_BAD_INPUT);
}

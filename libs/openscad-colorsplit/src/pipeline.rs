//! # Pipeline Driver
//!
//! ```text
//! source ─ scan ─┬─ group 0 ─┬─ color 0: isolate → render → import → fragment
//!                │           ├─ color 1: ...                 (parallel)
//!                │           └─ merge (after every color of the group)
//!                ├─ group 1 ...
//!                └─ material library
//! ```
//!
//! Colors of one group render on the worker pool. Results are collected
//! by color index, so numbering and merge order never depend on which
//! render finishes first. A failing unit never stops its siblings; only
//! input, output directory, merged file and material library problems end
//! the run.

use std::fs;
use std::path::{Path, PathBuf};

use config::constants::{EMPTY_SOLID_NAME, FALLBACK_DIFFUSE};
use openscad_annotate::{isolate, scan, AnnotatedSource, Diagnostic, IsolationUnit, Severity};
use openscad_obj::{
    diffuse_for, mtllib_reference, save_fragment, save_merged, save_placeholder_fragment,
    Material, MaterialLibrary, MeshPart,
};
use openscad_palette::Palette;
use pipeline_types::{ColorKey, Mesh};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::pattern::Placeholders;
use crate::renderer::Renderer;
use crate::settings::Settings;

// =============================================================================
// Run Summary
// =============================================================================

/// Outcome of one (group, color) unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    /// Rendered and imported.
    Rendered,
    /// The renderer failed or its artifact was unusable; an empty mesh
    /// stands in for it.
    RenderFailed { reason: String },
    /// Isolation or writing the source variant failed; nothing was rendered.
    Skipped { reason: String },
}

impl UnitStatus {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitSummary {
    /// Color discovery index, the `{number}` placeholder.
    pub number: usize,
    pub color: String,
    pub material: String,
    #[serde(flatten)]
    pub status: UnitStatus,
    pub triangles: usize,
    pub scad: PathBuf,
    pub stl: PathBuf,
    pub obj: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub merged: PathBuf,
    pub units: Vec<UnitSummary>,
}

/// Everything a run produced, in group and color order.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub mtl_output: PathBuf,
    pub colors: Vec<String>,
    pub groups: Vec<GroupSummary>,
    pub materials: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunSummary {
    pub fn units(&self) -> impl Iterator<Item = &UnitSummary> {
        self.groups.iter().flat_map(|group| group.units.iter())
    }

    /// Units that did not render.
    pub fn failed_units(&self) -> usize {
        self.units().filter(|unit| !unit.status.is_rendered()).count()
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// A mesh and how it was obtained.
struct UnitOutcome {
    summary: UnitSummary,
    mesh: Mesh,
}

/// Paths and names of one unit, all derived from the naming patterns.
struct UnitNames {
    color: ColorKey,
    group: String,
    material: String,
    scad: PathBuf,
    stl: PathBuf,
    obj: PathBuf,
}

pub struct Pipeline<'a, R> {
    settings: &'a Settings,
    palette: &'a Palette,
    renderer: &'a R,
}

impl<'a, R: Renderer> Pipeline<'a, R> {
    pub fn new(settings: &'a Settings, palette: &'a Palette, renderer: &'a R) -> Self {
        Self {
            settings,
            palette,
            renderer,
        }
    }

    /// Reads the input file and runs every unit.
    pub fn run(&self) -> PipelineResult<RunSummary> {
        let input = &self.settings.input;
        let source = fs::read_to_string(input).map_err(|source| PipelineError::Source {
            path: input.clone(),
            source,
        })?;
        self.run_source(&source)
    }

    /// Runs every unit of an already loaded source.
    pub fn run_source(&self, source: &str) -> PipelineResult<RunSummary> {
        let settings = self.settings;
        let annotated = scan(source, &settings.properties);
        report(annotated.diagnostics());
        tracing::info!(
            groups = annotated.groups().len(),
            colors = annotated.colors().len(),
            "scanned {}",
            settings.input.display()
        );

        fs::create_dir_all(&settings.output_dir).map_err(|source| PipelineError::OutputDir {
            path: settings.output_dir.clone(),
            source,
        })?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(settings.jobs.get())
            .thread_name(|index| format!("render-{index}"))
            .build()?;

        let mut library = MaterialLibrary::new();
        let mut groups = Vec::with_capacity(annotated.groups().len());

        for (group_index, group) in annotated.groups().iter().enumerate() {
            let outcomes: Vec<UnitOutcome> = pool.install(|| {
                (0..annotated.colors().len())
                    .into_par_iter()
                    .map(|color_index| {
                        self.process(
                            &annotated,
                            IsolationUnit {
                                group_index,
                                color_index,
                            },
                        )
                    })
                    .collect()
            });

            for outcome in outcomes.iter().filter(|o| o.summary.status.is_rendered()) {
                let color = &annotated.colors()[outcome.summary.number];
                self.add_material(&mut library, &outcome.summary.material, color);
            }

            let merged = settings.output_dir.join(
                Placeholders {
                    group: Some(&group.name),
                    ..Placeholders::input(&settings.input_name)
                }
                .expand(&settings.merge_pattern),
            );
            let parts: Vec<MeshPart<'_>> = outcomes
                .iter()
                .map(|outcome| MeshPart {
                    material: &outcome.summary.material,
                    mesh: &outcome.mesh,
                })
                .collect();
            tracing::info!(group = %group.name, path = %merged.display(), "merging");
            ensure_parent(&merged).map_err(|source| PipelineError::OutputDir {
                path: merged.clone(),
                source,
            })?;
            save_merged(&merged, &mtllib_reference(&merged, &settings.mtl_output), &parts)?;

            groups.push(GroupSummary {
                name: group.name.clone(),
                merged,
                units: outcomes.into_iter().map(|outcome| outcome.summary).collect(),
            });
        }

        tracing::info!(
            path = %settings.mtl_output.display(),
            materials = library.len(),
            "writing material library"
        );
        ensure_parent(&settings.mtl_output).map_err(|source| PipelineError::OutputDir {
            path: settings.mtl_output.clone(),
            source,
        })?;
        library.save(&settings.mtl_output)?;

        Ok(RunSummary {
            input: settings.input.clone(),
            output_dir: settings.output_dir.clone(),
            mtl_output: settings.mtl_output.clone(),
            colors: annotated.colors().iter().map(|c| c.as_str().to_string()).collect(),
            groups,
            materials: library.materials().iter().map(|m| m.name.clone()).collect(),
            diagnostics: annotated.diagnostics().to_vec(),
        })
    }

    fn names(&self, annotated: &AnnotatedSource, unit: IsolationUnit) -> UnitNames {
        let settings = self.settings;
        let color = annotated.colors()[unit.color_index].clone();
        let group = annotated.groups()[unit.group_index].name.clone();
        let names = Placeholders::unit(
            &settings.input_name,
            &group,
            unit.color_index,
            color.as_str(),
        );
        let path = |pattern: &str| settings.output_dir.join(names.expand(pattern));
        UnitNames {
            material: names.expand(&settings.material_pattern),
            scad: path(&settings.scad_pattern),
            stl: path(&settings.stl_pattern),
            obj: path(&settings.obj_pattern),
            color,
            group,
        }
    }

    fn process(&self, annotated: &AnnotatedSource, unit: IsolationUnit) -> UnitOutcome {
        let names = self.names(annotated, unit);
        let (status, mesh) = self.render_unit(annotated, unit, &names);

        let mtllib = mtllib_reference(&names.obj, &self.settings.mtl_output);
        let written = match &status {
            UnitStatus::Rendered => Some(save_fragment(&names.obj, &mtllib, &names.material, &mesh)),
            UnitStatus::RenderFailed { .. } => {
                Some(save_placeholder_fragment(&names.obj, &mtllib, &names.material))
            }
            UnitStatus::Skipped { .. } => None,
        };
        match written {
            Some(Ok(())) => tracing::info!(
                group = %names.group,
                color = %names.color,
                path = %names.obj.display(),
                "wrote object"
            ),
            Some(Err(e)) => tracing::warn!(
                group = %names.group,
                color = %names.color,
                error = %e,
                "cannot write object"
            ),
            None => {}
        }

        UnitOutcome {
            summary: UnitSummary {
                number: unit.color_index,
                color: names.color.as_str().to_string(),
                material: names.material,
                status,
                triangles: mesh.triangle_count(),
                scad: names.scad,
                stl: names.stl,
                obj: names.obj,
            },
            mesh,
        }
    }

    fn render_unit(
        &self,
        annotated: &AnnotatedSource,
        unit: IsolationUnit,
        names: &UnitNames,
    ) -> (UnitStatus, Mesh) {
        let (group, color) = (&names.group, &names.color);
        let skipped = |reason: String| {
            tracing::warn!(group = %group, color = %color, %reason, "skipping unit");
            (UnitStatus::Skipped { reason }, Mesh::new(EMPTY_SOLID_NAME))
        };

        for path in [&names.scad, &names.stl, &names.obj] {
            if let Err(e) = ensure_parent(path) {
                return skipped(format!("cannot create directory for {}: {e}", path.display()));
            }
        }

        let variant = match isolate(annotated, unit, self.settings.isolation) {
            Ok(variant) => variant,
            Err(e) => return skipped(e.to_string()),
        };
        if let Err(e) = fs::write(&names.scad, variant.to_source()) {
            return skipped(format!("cannot write {}: {e}", names.scad.display()));
        }
        tracing::info!(group = %group, color = %color, path = %names.scad.display(), "wrote source variant");

        tracing::info!(group = %group, color = %color, path = %names.stl.display(), "rendering");
        let rendered = self
            .renderer
            .render(&names.scad, &names.stl)
            .map_err(|e| e.to_string())
            .and_then(|()| openscad_stl::load(&names.stl).map_err(|e| e.to_string()));

        match rendered {
            Ok(mesh) => {
                tracing::info!(
                    group = %group,
                    color = %color,
                    triangles = mesh.triangle_count(),
                    "imported mesh"
                );
                (UnitStatus::Rendered, mesh)
            }
            Err(reason) => {
                tracing::warn!(group = %group, color = %color, %reason, "render failed, using empty mesh");
                if let Err(e) = openscad_stl::save_placeholder(&names.stl) {
                    tracing::warn!(group = %group, color = %color, error = %e, "cannot write placeholder");
                }
                (UnitStatus::RenderFailed { reason }, Mesh::new(EMPTY_SOLID_NAME))
            }
        }
    }

    fn add_material(&self, library: &mut MaterialLibrary, name: &str, color: &ColorKey) {
        if library.contains(name) {
            return;
        }
        let diffuse = diffuse_for(color, self.palette).unwrap_or_else(|e| {
            tracing::warn!(material = name, error = %e, "using white");
            FALLBACK_DIFFUSE
        });
        library.add(Material::new(name, diffuse));
    }
}

/// Pattern expansions may name subdirectories of the output directory.
fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!("{diagnostic}"),
            Severity::Note => tracing::debug!("{diagnostic}"),
        }
    }
}

/// Loads the palette file named in the settings, or the built-in palette.
pub fn load_palette(path: Option<&Path>) -> PipelineResult<Palette> {
    match path {
        Some(path) => {
            let palette = Palette::load(path)?;
            tracing::info!(path = %path.display(), colors = palette.len(), "loaded palette");
            Ok(palette)
        }
        None => Ok(Palette::builtin()),
    }
}

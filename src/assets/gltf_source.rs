use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use glam::{Quat, Vec3};

use crate::assets::loader::ModelSource;
use crate::scene_graph::{MeshId, ModelTemplate, SceneNode, SurfaceMesh, Transform};

pub type Buffers<'a> = &'a [gltf::buffer::Data];

/// Loads `.gltf`/`.glb` files relative to a root directory.
#[derive(Debug, Clone)]
pub struct GltfSource {
    root: PathBuf,
}

impl GltfSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ModelSource for GltfSource {
    fn load(&self, url: &str) -> anyhow::Result<ModelTemplate> {
        load_gltf(&self.root.join(url), url)
    }
}

pub fn load_gltf(path: &Path, url: &str) -> anyhow::Result<ModelTemplate> {
    let (document, buffers, _images) = gltf::import(path)
        .with_context(|| format!("Failed to import glTF {}", path.display()))?;
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("No scenes in gltf")?;

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| url.to_string());

    let mut builder = TemplateBuilder {
        template: ModelTemplate::new(name, url),
        buffers: &buffers,
        gltf_mesh_to_surface: HashMap::new(),
    };

    for node in scene.nodes() {
        let node = builder.spawn_node(&node)?;
        builder.template.add_node(node);
    }

    log::debug!(
        "Imported {} with {} unique meshes",
        builder.template.name,
        builder.template.mesh_count()
    );

    Ok(builder.template)
}

struct TemplateBuilder<'a> {
    template: ModelTemplate,
    buffers: Buffers<'a>,
    gltf_mesh_to_surface: HashMap<usize, MeshId>,
}

impl TemplateBuilder<'_> {
    fn spawn_node(&mut self, node: &gltf::Node) -> anyhow::Result<SceneNode> {
        let node_name = node.name().unwrap_or("Unnamed").to_string();
        let (transform, stretch) = node_transform(node);
        let has_children = node.children().next().is_some();

        let mut children = Vec::new();

        if let Some(mesh) = node.mesh() {
            let mesh_id = self.surface_for(&node_name, mesh)?;

            if !has_children {
                let surface = SceneNode::surface(node_name, transform, mesh_id);
                return Ok(surface.with_stretch(stretch));
            }

            children.push(SceneNode::surface(
                format!("{} (Mesh)", node_name),
                Transform::identity(),
                mesh_id,
            ));
        }

        for child in node.children() {
            children.push(self.spawn_node(&child)?);
        }

        Ok(SceneNode::group(node_name, transform, children).with_stretch(stretch))
    }

    fn surface_for(&mut self, node_name: &str, mesh: gltf::Mesh) -> anyhow::Result<MeshId> {
        let mesh_index = mesh.index();

        if let Some(mesh_id) = self.gltf_mesh_to_surface.get(&mesh_index).copied() {
            return Ok(mesh_id);
        }

        let mesh_name = mesh
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("{} (Mesh)", node_name));
        let surface = surface_from_gltf(mesh_name, mesh, self.buffers)?;
        let mesh_id = self.template.add_mesh(surface);
        self.gltf_mesh_to_surface.insert(mesh_index, mesh_id);

        Ok(mesh_id)
    }
}

/// Splits a glTF node transform into a rigid part and its per-axis scale.
fn node_transform(node: &gltf::Node) -> (Transform, Vec3) {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform::new(translation.into(), Quat::from_array(rotation), 1.0);
    (transform, Vec3::from(scale))
}

/// Merges every triangle primitive of `mesh` into one collision surface.
fn surface_from_gltf(
    name: String,
    mesh: gltf::Mesh,
    buffers: Buffers,
) -> anyhow::Result<SurfaceMesh> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            return Err(anyhow::anyhow!(
                "Unsupported primitive mode: {:?}",
                primitive.mode()
            ));
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let base = positions.len() as u32;
        let position_reader = reader
            .read_positions()
            .with_context(|| format!("Failed to read positions of {}", name))?;
        positions.extend(position_reader.map(Vec3::from));

        match reader.read_indices() {
            Some(index_reader) => indices.extend(index_reader.into_u32().map(|i| base + i)),
            None => indices.extend(base..positions.len() as u32),
        }
    }

    if positions.is_empty() {
        return Err(anyhow::anyhow!("Mesh without primitives: {}", name));
    }

    Ok(SurfaceMesh::new(name, positions, indices)?)
}

//! Wavefront OBJ export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::surface::{SurfaceRole, TerrainMesh};
use crate::core::Result;

fn group_name(role: SurfaceRole) -> &'static str {
    match role {
        SurfaceRole::Tops => "tops",
        SurfaceRole::Sides => "sides",
        SurfaceRole::Debug => "debug",
        SurfaceRole::Tube => "tube",
        SurfaceRole::Landscape => "landscape",
    }
}

/// Write every non-empty surface as an OBJ group with positions, UVs and normals.
pub fn write_obj<W: Write>(mesh: &TerrainMesh, out: &mut W) -> Result<()> {
    writeln!(out, "# tg-procgen mesh: {} triangles", mesh.triangle_count())?;

    // OBJ indices are 1-based and global across groups
    let mut base = 1usize;
    for surface in mesh.surfaces.iter().filter(|s| !s.is_empty()) {
        writeln!(out, "g {}", group_name(surface.role))?;
        if let Some(material) = surface.material {
            writeln!(out, "usemtl material_{}", material)?;
        }
        for p in &surface.positions {
            writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for uv in &surface.uvs {
            writeln!(out, "vt {} {}", uv.x, uv.y)?;
        }
        for n in &surface.normals {
            writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
        }
        for tri in surface.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize + base);
            writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
        base += surface.vertex_count();
    }
    Ok(())
}

/// Write `mesh` to an OBJ file, creating parent directories.
pub fn save_obj(path: &Path, mesh: &TerrainMesh) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    write_obj(mesh, &mut out)?;
    out.flush()?;
    log::info!("Wrote {} ({} triangles)", path.display(), mesh.triangle_count());
    Ok(())
}

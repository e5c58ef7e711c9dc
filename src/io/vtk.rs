use crate::{
  error::{Error, Result},
  fe::FeFunction,
  mesh::SimplicialMesh,
  problems::heat::StepObserver,
};

use std::{
  fs::File,
  io::{BufWriter, Write},
  path::{Path, PathBuf},
};
use vtkio::{
  model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, DataArray, ElementType,
    UnstructuredGridPiece, Version, VertexNumbers, Vtk,
  },
  IOBuffer,
};

/// Unstructured grid of the mesh, optionally with a named point scalar.
pub fn mesh_to_vtk(
  mesh: &SimplicialMesh,
  point_data: Option<(&str, &FeFunction)>,
) -> Result<Vtk> {
  let cell_type = match mesh.dim() {
    1 => CellType::Line,
    2 => CellType::Triangle,
    3 => CellType::Tetra,
    dim => return Err(Error::Vtk(format!("no VTK cell type for dimension {dim}"))),
  };

  // VTK points are always 3D.
  let points: Vec<f64> = mesh
    .coord_iter()
    .flat_map(|coord| (0..3).map(move |i| if i < coord.len() { coord[i] } else { 0.0 }))
    .collect();

  let connectivity = mesh
    .cells()
    .iter()
    .flat_map(|cell| cell.iter().map(|&v| v as u64))
    .collect();
  let offsets = mesh
    .cells()
    .iter()
    .scan(0, |offset, cell| {
      *offset += cell.len() as u64;
      Some(*offset)
    })
    .collect();

  let cell_verts = VertexNumbers::XML {
    connectivity,
    offsets,
  };
  let types = vec![cell_type; mesh.ncells()];
  let cells = Cells { cell_verts, types };

  let mut data = Attributes::default();
  if let Some((name, fe)) = point_data {
    data.point.push(Attribute::DataArray(DataArray {
      name: name.to_string(),
      elem: ElementType::Scalars {
        num_comp: 1,
        lookup_table: None,
      },
      data: IOBuffer::new(fe.coeffs().iter().copied().collect::<Vec<f64>>()),
    }));
  }

  let grid = UnstructuredGridPiece {
    points: IOBuffer::new(points),
    cells,
    data,
  };

  Ok(Vtk {
    version: Version::new((4, 2)),
    title: String::from("heatbench solution"),
    byte_order: ByteOrder::native(),
    data: grid.into(),
    file_path: None,
  })
}

pub fn save_vtu(
  path: impl AsRef<Path>,
  mesh: &SimplicialMesh,
  point_data: Option<(&str, &FeFunction)>,
) -> Result<()> {
  mesh_to_vtk(mesh, point_data)?
    .export(path.as_ref())
    .map_err(|err| Error::Vtk(format!("{}: {err:?}", path.as_ref().display())))
}

/// ParaView collection file referencing one dataset per time.
pub fn write_pvd<W: Write>(mut writer: W, entries: &[(f64, String)]) -> std::io::Result<()> {
  writeln!(writer, r#"<?xml version="1.0"?>"#)?;
  writeln!(writer, r#"<VTKFile type="Collection" version="0.1">"#)?;
  writeln!(writer, "  <Collection>")?;
  for (t, file) in entries {
    writeln!(
      writer,
      r#"    <DataSet timestep="{t}" part="0" file="{file}"/>"#
    )?;
  }
  writeln!(writer, "  </Collection>")?;
  writeln!(writer, "</VTKFile>")?;
  Ok(())
}

/// Writes every `interval`-th state as `solution_{step:03}.vtu`,
/// and the collection `solution.pvd` on [`VtkSeriesWriter::finish`].
pub struct VtkSeriesWriter<'m> {
  mesh: &'m SimplicialMesh,
  dir: PathBuf,
  interval: usize,
  entries: Vec<(f64, String)>,
}

impl<'m> VtkSeriesWriter<'m> {
  pub fn new(mesh: &'m SimplicialMesh, dir: impl Into<PathBuf>, interval: usize) -> Result<Self> {
    let dir = dir.into();
    std::fs::create_dir_all(&dir).map_err(Error::file(&dir))?;
    Ok(Self {
      mesh,
      dir,
      interval: interval.max(1),
      entries: Vec::new(),
    })
  }

  pub fn nwritten(&self) -> usize {
    self.entries.len()
  }

  pub fn finish(self) -> Result<PathBuf> {
    let path = self.dir.join("solution.pvd");
    let file = File::create(&path).map_err(Error::file(&path))?;
    let mut writer = BufWriter::new(file);
    write_pvd(&mut writer, &self.entries).map_err(Error::file(&path))?;
    writer.flush().map_err(Error::file(&path))?;
    Ok(path)
  }
}

impl StepObserver for VtkSeriesWriter<'_> {
  fn observe(&mut self, step: usize, time: f64, state: &FeFunction) -> Result<()> {
    if step % self.interval != 0 {
      return Ok(());
    }
    let file_name = format!("solution_{step:03}.vtu");
    save_vtu(self.dir.join(&file_name), self.mesh, Some(("u", state)))?;
    self.entries.push((time, file_name));
    Ok(())
  }
}

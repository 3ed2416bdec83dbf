//! Append-only time-series snapshot files.
//!
//! A snapshot file associates each persisted field sample with a physical
//! time value. The mesh geometry is written exactly once in a header
//! record; every subsequent record carries only field values. Records are
//! flushed as they are written and never rewritten, so a crashed run
//! leaves a valid prefix of the time series.
//!
//! Format: JSON Lines. Line 1 is the header, each following line is one
//! `SnapshotRecord`.

use crate::error::{IoError, Result};
use eld_model::Mesh;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Header record: geometry and field identity, written once
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotHeader {
    /// Name of the persisted field (e.g. "displacement")
    pub function_name: String,
    /// Node IDs, in mesh order
    pub node_ids: Vec<i32>,
    /// Node coordinates, in mesh order
    pub coordinates: Vec<[f64; 3]>,
}

impl SnapshotHeader {
    fn from_mesh(mesh: &Mesh, function_name: &str) -> Self {
        Self {
            function_name: function_name.to_string(),
            node_ids: mesh.nodes.iter().map(|n| n.id).collect(),
            coordinates: mesh.nodes.iter().map(|n| n.coords()).collect(),
        }
    }
}

/// One persisted field sample keyed by physical time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotRecord {
    /// Physical time of the sample
    pub time: f64,
    /// Global DOF values of the field
    pub values: Vec<f64>,
}

/// Append-only writer for a time-series snapshot file
pub struct TimeSeriesWriter {
    writer: BufWriter<File>,
    num_snapshots: usize,
}

impl TimeSeriesWriter {
    /// Create a new snapshot file, writing the geometry header immediately
    pub fn create<P: AsRef<Path>>(path: P, mesh: &Mesh, function_name: &str) -> Result<Self> {
        if mesh.nodes.is_empty() {
            return Err(IoError::InvalidData(
                "Cannot create a snapshot file for an empty mesh".to_string(),
            ));
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let header = SnapshotHeader::from_mesh(mesh, function_name);
        serde_json::to_writer(&mut writer, &header)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(Self {
            writer,
            num_snapshots: 0,
        })
    }

    /// Append one field sample at the given physical time and flush.
    ///
    /// A broken output stream is fatal to the run: a skipped record would
    /// invalidate the remainder of the series.
    pub fn write(&mut self, values: &[f64], time: f64) -> Result<()> {
        let record = SnapshotRecord {
            time,
            values: values.to_vec(),
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.num_snapshots += 1;
        Ok(())
    }

    /// Number of snapshots written so far (header excluded)
    pub fn len(&self) -> usize {
        self.num_snapshots
    }

    /// True if no snapshot has been written yet
    pub fn is_empty(&self) -> bool {
        self.num_snapshots == 0
    }
}

/// Reader for an existing time-series snapshot file
pub struct TimeSeriesReader {
    header: SnapshotHeader,
    records: Vec<SnapshotRecord>,
}

impl TimeSeriesReader {
    /// Open a snapshot file and validate it against a mesh and field name.
    ///
    /// The dataset must have been written for the same node set; a
    /// different field name, node count, node numbering, or geometry is
    /// rejected up front rather than at the first read.
    pub fn open<P: AsRef<Path>>(path: P, mesh: &Mesh, function_name: &str) -> Result<Self> {
        let file = File::open(path)?;
        let mut lines = BufReader::new(file).lines();

        let header_line = lines
            .next()
            .ok_or_else(|| IoError::InvalidData("Snapshot file is empty".to_string()))??;
        let header: SnapshotHeader = serde_json::from_str(&header_line)?;

        if header.function_name != function_name {
            return Err(IoError::FunctionMismatch {
                expected: function_name.to_string(),
                found: header.function_name,
            });
        }
        if header.node_ids.len() != mesh.nodes.len() {
            return Err(IoError::InvalidData(format!(
                "Dataset has {} nodes, mesh has {}",
                header.node_ids.len(),
                mesh.nodes.len()
            )));
        }
        if header.coordinates.len() != header.node_ids.len() {
            return Err(IoError::InvalidData(format!(
                "Dataset header has {} node ids but {} coordinates",
                header.node_ids.len(),
                header.coordinates.len()
            )));
        }
        for (node, (&id, coords)) in mesh
            .nodes
            .iter()
            .zip(header.node_ids.iter().zip(&header.coordinates))
        {
            if node.id != id {
                return Err(IoError::InvalidData(format!(
                    "Dataset node id {} does not match mesh node id {}",
                    id, node.id
                )));
            }
            let mesh_coords = node.coords();
            if mesh_coords
                .iter()
                .zip(coords)
                .any(|(a, b)| (a - b).abs() > 1e-9)
            {
                return Err(IoError::InvalidData(format!(
                    "Dataset geometry does not match the mesh at node {}",
                    node.id
                )));
            }
        }

        let mut records = Vec::new();
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }

        Ok(Self { header, records })
    }

    /// The geometry/identity header
    pub fn header(&self) -> &SnapshotHeader {
        &self.header
    }

    /// Number of snapshots in the file
    pub fn num_snapshots(&self) -> usize {
        self.records.len()
    }

    /// Read the snapshot for a zero-based step index
    pub fn read_step(&self, step: usize) -> Result<&SnapshotRecord> {
        self.records
            .get(step)
            .ok_or(IoError::MissingSnapshot { step })
    }
}

//! Reference-embedding artifact: one `[n_skills × dim]` F32 matrix on disk

use crate::error::{Result, SkillExtractorError};
use ndarray::Array2;
use safetensors::tensor::{Dtype, SafeTensors, TensorView};
use std::path::Path;

/// Tensor name inside the safetensors file
pub const EMBEDDINGS_TENSOR: &str = "embeddings";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArtifactFormat {
    SafeTensors,
    Json,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ArtifactFormat::Json,
            _ => ArtifactFormat::SafeTensors,
        }
    }
}

pub fn read_embeddings(path: &Path) -> Result<Array2<f32>> {
    let bytes = std::fs::read(path).map_err(|e| {
        SkillExtractorError::CatalogLoad(format!("cannot read {}: {}", path.display(), e))
    })?;

    match ArtifactFormat::from_path(path) {
        ArtifactFormat::SafeTensors => decode_safetensors(&bytes),
        ArtifactFormat::Json => decode_json(&bytes),
    }
    .map_err(|e| match e {
        SkillExtractorError::CatalogLoad(msg) => {
            SkillExtractorError::CatalogLoad(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

fn decode_safetensors(bytes: &[u8]) -> Result<Array2<f32>> {
    let tensors = SafeTensors::deserialize(bytes)?;
    let view = tensors.tensor(EMBEDDINGS_TENSOR)?;

    if view.dtype() != Dtype::F32 {
        return Err(SkillExtractorError::CatalogLoad(format!(
            "tensor '{}' has dtype {:?}, expected F32",
            EMBEDDINGS_TENSOR,
            view.dtype()
        )));
    }

    let shape = view.shape();
    if shape.len() != 2 {
        return Err(SkillExtractorError::CatalogLoad(format!(
            "tensor '{}' must be 2-D, got shape {:?}",
            EMBEDDINGS_TENSOR, shape
        )));
    }

    let values: Vec<f32> = view
        .data()
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Array2::from_shape_vec((shape[0], shape[1]), values)
        .map_err(|e| SkillExtractorError::CatalogLoad(format!("bad tensor layout: {}", e)))
}

fn decode_json(bytes: &[u8]) -> Result<Array2<f32>> {
    let rows: Vec<Vec<f32>> = serde_json::from_slice(bytes)
        .map_err(|e| SkillExtractorError::CatalogLoad(format!("malformed JSON matrix: {}", e)))?;

    let dim = rows.first().map(Vec::len).unwrap_or(0);
    let mut flat = Vec::with_capacity(rows.len() * dim);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(SkillExtractorError::CatalogLoad(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                dim
            )));
        }
        flat.extend_from_slice(row);
    }

    Array2::from_shape_vec((rows.len(), dim), flat)
        .map_err(|e| SkillExtractorError::CatalogLoad(format!("bad matrix layout: {}", e)))
}

pub fn write_embeddings(path: &Path, matrix: &Array2<f32>) -> Result<()> {
    let content = match ArtifactFormat::from_path(path) {
        ArtifactFormat::SafeTensors => encode_safetensors(matrix)?,
        ArtifactFormat::Json => {
            let rows: Vec<Vec<f32>> = matrix.rows().into_iter().map(|r| r.to_vec()).collect();
            serde_json::to_vec(&rows)?
        }
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn encode_safetensors(matrix: &Array2<f32>) -> Result<Vec<u8>> {
    let bytes: Vec<u8> = matrix
        .as_standard_layout()
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();

    let view = TensorView::new(Dtype::F32, vec![matrix.nrows(), matrix.ncols()], &bytes)
        .map_err(|e| SkillExtractorError::CatalogBuild(format!("invalid tensor: {}", e)))?;

    safetensors::serialize([(EMBEDDINGS_TENSOR, view)], &None)
        .map_err(|e| SkillExtractorError::CatalogBuild(format!("Failed to serialize embeddings: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    #[test]
    fn test_safetensors_artifact_is_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("skills_embeddings.safetensors");
        let matrix = array![[0.5_f32, -1.0, 2.0], [0.0, 3.25, 1.0]];

        write_embeddings(&path, &matrix).unwrap();
        assert_eq!(read_embeddings(&path).unwrap(), matrix);
    }

    #[test]
    fn test_json_artifact_requires_uniform_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("embeddings.json");
        std::fs::write(&path, "[[1.0, 0.0], [0.5]]").unwrap();

        let err = read_embeddings(&path).unwrap_err();
        assert!(matches!(err, SkillExtractorError::CatalogLoad(_)));
    }

    #[test]
    fn test_corrupt_safetensors_is_a_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.safetensors");
        std::fs::write(&path, b"not a tensor file").unwrap();

        assert!(matches!(
            read_embeddings(&path),
            Err(SkillExtractorError::CatalogLoad(_))
        ));
    }

    #[test]
    fn test_missing_artifact_is_a_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.safetensors");
        assert!(matches!(
            read_embeddings(&path),
            Err(SkillExtractorError::CatalogLoad(_))
        ));
    }
}

use std::path::Path;

use crate::{fs::LoadError, numerics::Element};

/// Reads a `.npy` file of `f32` values of any rank, flattened in storage
/// order and converted to `T`.
pub fn load_npy<T: Element>(path: &Path) -> Result<Vec<T>, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = parse_npy(&bytes)?;
    tracing::debug!(path = %path.display(), len = data.len(), element = T::NAME, "loaded npy source");
    Ok(data)
}

/// Parses in-memory `.npy` bytes. See [`load_npy`].
pub fn parse_npy<T: Element>(bytes: &[u8]) -> Result<Vec<T>, LoadError> {
    let npy = npyz::NpyFile::new(bytes).map_err(LoadError::Npy)?;
    let shape = npy.shape().to_vec();
    if shape.is_empty() {
        return Err(LoadError::Shape(shape));
    }

    let len = shape
        .iter()
        .try_fold(1u64, |acc, &dim| acc.checked_mul(dim))
        .and_then(|len| usize::try_from(len).ok())
        .ok_or_else(|| LoadError::Shape(shape.clone()))?;

    // the header is untrusted, never reserve more than the payload can hold
    let mut result = Vec::with_capacity(len.min(bytes.len() / size_of::<f32>()));
    for value in npy.data::<f32>()? {
        result.push(T::from_f32(value.map_err(LoadError::Npy)?));
    }

    Ok(result)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use half::f16;

    fn npy_bytes(descr: &str, shape: &str, payload: &[u8]) -> Vec<u8> {
        let mut header = format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': {shape}, }}");
        while (10 + header.len() + 1) % 64 != 0 {
            header.push(' ');
        }
        header.push('\n');

        let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn f32_payload(data: &[f32]) -> Vec<u8> {
        data.iter().flat_map(|x| x.to_le_bytes()).collect()
    }

    #[test]
    fn test_parse_1d() {
        let bytes = npy_bytes("<f4", "(4,)", &f32_payload(&[1.0, 2.0, 3.0, 4.0]));
        let data: Vec<f32> = parse_npy(&bytes).unwrap();
        assert_eq!(data, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_parse_2d_is_flattened() {
        let values: Vec<f32> = (0..6).map(|i| i as f32).collect();
        let bytes = npy_bytes("<f4", "(2, 3)", &f32_payload(&values));
        let data: Vec<f32> = parse_npy(&bytes).unwrap();
        assert_eq!(data, values);
    }

    #[test]
    fn test_parse_converts_element_type() {
        let bytes = npy_bytes("<f4", "(2,)", &f32_payload(&[0.5, -1.0]));
        let data: Vec<f16> = parse_npy(&bytes).unwrap();
        assert_eq!(data, vec![f16::from_f32(0.5), f16::from_f32(-1.0)]);
    }

    #[test]
    fn test_scalar_array_is_rejected() {
        let bytes = npy_bytes("<f4", "()", &f32_payload(&[1.0]));
        assert!(parse_npy::<f32>(&bytes).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            parse_npy::<f32>(b"definitely not numpy"),
            Err(LoadError::Npy(_))
        ));
    }

    #[test]
    fn test_f64_array_is_a_dtype_error() {
        let payload: Vec<u8> = [1.0f64, 2.0].iter().flat_map(|x| x.to_le_bytes()).collect();
        let bytes = npy_bytes("<f8", "(2,)", &payload);
        assert!(matches!(parse_npy::<f32>(&bytes), Err(LoadError::DType(_))));
    }

    #[test]
    fn test_huge_header_shape_is_an_error() {
        let bytes = npy_bytes("<f4", "(4611686018427387904,)", &f32_payload(&[1.0]));
        assert!(parse_npy::<f32>(&bytes).is_err());
    }

    #[test]
    fn test_overflowing_shape_is_rejected() {
        let bytes = npy_bytes(
            "<f4",
            "(4294967296, 4294967296, 4294967296)",
            &f32_payload(&[1.0]),
        );
        assert!(matches!(parse_npy::<f32>(&bytes), Err(LoadError::Shape(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("vecxfer-load-{}.npy", std::process::id()));
        std::fs::write(&path, npy_bytes("<f4", "(3,)", &f32_payload(&[7.0, 8.0, 9.0]))).unwrap();
        let data: Vec<f32> = load_npy(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(data, vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_npy::<f32>(Path::new("/nonexistent/vecxfer.npy")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/vecxfer.npy"));
    }
}

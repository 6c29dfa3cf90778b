//! Built-in sample HR export used by the `demo` command.

use crate::apis::in_memory::InMemoryAdapter;
use crate::apis::tabular_file::rows_from_csv;
use crate::error::Result;
use crate::pipeline::processing::normalize::{FieldMapping, NormalizerConfig};

pub const DEMO_SOURCE_ID: &str = "sample_hr";

pub const SAMPLE_HR_CSV: &str = "\
emp_id,name,gender,designation,grade,department,status
1001,Priya Sharma,F,Senior Manager,M3,Engineering,Active
1002,Rahul Verma,M,VP Engineering,E3,Engineering,Active
1003,Neha Gupta,F,Software Engineer,A2,Engineering,Active
1004,Amit Kumar,M,Director,M4,Sales,Active
1005,Sneha Patel,F,Analyst,A1,Finance,Active
1006,Vikram Singh,M,CEO,E1,Executive,Active
1007,Anjali Reddy,F,Team Lead,M1,Engineering,Active
1008,Manoj Iyer,M,Associate,A1,Operations,Active
1009,Divya Nair,F,Senior Analyst,A3,Finance,Active
1010,Arjun Menon,M,Manager,M2,Sales,Active
";

pub fn sample_mapping() -> FieldMapping {
    FieldMapping {
        gender: Some("gender".to_string()),
        title: Some("designation".to_string()),
        grade: Some("grade".to_string()),
        status: Some("status".to_string()),
        department: Some("department".to_string()),
        ..FieldMapping::default()
    }
}

pub fn sample_source() -> Result<InMemoryAdapter> {
    let rows = rows_from_csv(SAMPLE_HR_CSV)?;
    Ok(InMemoryAdapter::new(
        DEMO_SOURCE_ID,
        NormalizerConfig::with_mapping(sample_mapping()),
        rows,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceAdapter;

    #[tokio::test]
    async fn sample_has_ten_rows_with_mapped_columns() {
        let source = sample_source().unwrap();
        let rows = source.fetch_raw_records().await.unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[5]["designation"], "CEO");
        assert_eq!(rows[5]["grade"], "E1");
    }
}

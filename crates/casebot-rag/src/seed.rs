//! Sample case reports for the in-memory store

use serde_json::json;

use casebot_core::{Result, VectorDocument, VectorStore};

const SAMPLE_REPORTS: &[(&str, &str)] = &[
    (
        "Musculoskeletal",
        "A 45-year-old recreational runner presented with six weeks of anterior knee pain \
         worse on stairs. Examination showed patellofemoral tenderness without effusion. \
         Symptoms improved with quadriceps strengthening and load management.",
    ),
    (
        "Musculoskeletal",
        "A 32-year-old skier reported a twisting injury followed by medial knee pain and \
         locking. MRI confirmed a bucket-handle tear of the medial meniscus, treated with \
         arthroscopic repair.",
    ),
    (
        "Rheumatology",
        "A 71-year-old woman with bilateral knee pain and morning stiffness under thirty \
         minutes had joint space narrowing on radiographs consistent with osteoarthritis.",
    ),
    (
        "Infectious disease",
        "A 58-year-old man with diabetes presented with an acutely hot, swollen knee and \
         fever. Synovial fluid culture grew Staphylococcus aureus; septic arthritis was \
         treated with washout and intravenous antibiotics.",
    ),
    (
        "Respiratory",
        "A 9-year-old with known asthma presented with wheeze and reduced peak flow after a \
         viral illness and responded to nebulised bronchodilators and oral steroids.",
    ),
    (
        "Cardiology",
        "A 63-year-old smoker presented with crushing chest pain radiating to the left arm. \
         ECG showed inferior ST elevation and he underwent primary angioplasty.",
    ),
];

/// Store the bundled sample reports, returning how many were stored
pub async fn seed_sample_reports<V: VectorStore + ?Sized>(store: &V) -> Result<usize> {
    let documents: Vec<VectorDocument> = SAMPLE_REPORTS
        .iter()
        .enumerate()
        .map(|(i, (specialty, content))| VectorDocument {
            metadata: json!({
                "specialty": specialty,
                "type": "case_report",
            }),
            ..VectorDocument::new(format!("sample_case_{}", i + 1), *content)
        })
        .collect();

    let ids = store.store_batch(documents).await?;
    Ok(ids.len())
}

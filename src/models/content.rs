//! Site copy document and its embedded case studies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One customer-success record, shown in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStudy {
    pub id: String,
    pub title: String,
    pub industry: String,
    pub metrics: String,
    pub description: String,
}

impl CaseStudy {
    /// Fresh record with placeholder copy, ready for the admin to edit.
    pub fn placeholder() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: "新案例標題".to_string(),
            industry: "產業類別".to_string(),
            metrics: "$0".to_string(),
            description: "請輸入案例描述...".to_string(),
        }
    }
}

/// The single editable document behind all marketing copy.
///
/// Every field is required when deserializing; the document is always
/// replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    pub hero_title: String,
    pub hero_description: String,

    pub about_title: String,
    pub about_description: String,

    pub engine_title: String,
    pub engine_description: String,

    pub software_title: String,
    pub software_description: String,

    pub case_studies: Vec<CaseStudy>,

    pub contact_email: String,
    pub contact_address: String,
}

impl SiteContent {
    /// Append a placeholder case study and return a copy of it.
    pub fn add_case_study(&mut self) -> CaseStudy {
        let study = CaseStudy::placeholder();
        self.case_studies.push(study.clone());
        study
    }

    /// Drop the case study with `id`. Returns whether one was removed.
    pub fn remove_case_study(&mut self, id: &str) -> bool {
        let before = self.case_studies.len();
        self.case_studies.retain(|study| study.id != id);
        self.case_studies.len() != before
    }
}

impl Default for SiteContent {
    fn default() -> Self {
        Self {
            hero_title: "工業可靠性的核心操作系統".to_string(),
            hero_description: "解讀物理基礎設施的訊號。我們整合振動、聲學和熱影像數據，\
                在故障影響生產產能之前精準預測，實現真正的零停機製造。"
                .to_string(),

            about_title: "物理導向的人工智慧 (Physics-Informed AI)".to_string(),
            about_description: "PrediMaint 結合摩擦學 (Tribology) 與熱力學的領域專業知識，\
                輔以先進的深度學習模型，提供處方級的診斷。我們不僅僅是一個儀表板，\
                而是您的自動化可靠性工程師，24/7 守護您的關鍵資產。"
                .to_string(),

            engine_title: "設備異常診斷引擎".to_string(),
            engine_description: "我們的核心運算引擎在邊緣端處理高頻原始感測數據 (20kHz+)。\
                利用快速傅立葉變換 (FFT) 和包絡分析，在毫秒級別內偵測軸承故障、動不平衡、\
                不對心及氣蝕現象。"
                .to_string(),

            software_title: "預知保養軟體套件".to_string(),
            software_description: "針對您整個資產艦隊的中央指揮中心。\
                根據資產健康評分自動在 SAP/Maximo 中排程工單，視覺化長期劣化趨勢，\
                並利用 AI 優化備品庫存管理策略。"
                .to_string(),

            case_studies: vec![
                CaseStudy {
                    id: "1".to_string(),
                    title: "石化煉油廠泵浦優化".to_string(),
                    industry: "石油與天然氣".to_string(),
                    metrics: "年省 $240 萬美元".to_string(),
                    description: "在關鍵飼水泵浦故障前 3 週偵測到早期氣蝕現象，\
                        成功避免了非計畫性停機與產線中斷。"
                        .to_string(),
                },
                CaseStudy {
                    id: "2".to_string(),
                    title: "汽車裝配線馬達監測".to_string(),
                    industry: "精密製造".to_string(),
                    metrics: "99.9% 稼動率".to_string(),
                    description: "在機械手臂關節部署 500+ 個無線感測器。\
                        透過狀態基礎監測 (CBM) 減少了 40% 的維護工時。"
                        .to_string(),
                },
            ],

            contact_email: "sales@predimaint.io".to_string(),
            contact_address: "台北市信義區信義路五段7號 (台北101)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_fields() {
        let json = serde_json::to_value(SiteContent::default()).unwrap();
        assert!(json.get("heroTitle").is_some());
        assert!(json.get("caseStudies").unwrap().is_array());
        assert!(json.get("contactAddress").is_some());
        assert!(json.get("hero_title").is_none());
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let mut json = serde_json::to_value(SiteContent::default()).unwrap();
        json.as_object_mut().unwrap().remove("contactEmail");
        assert!(serde_json::from_value::<SiteContent>(json).is_err());
    }

    #[test]
    fn test_empty_strings_are_legal() {
        let mut json = serde_json::to_value(SiteContent::default()).unwrap();
        json["heroTitle"] = serde_json::json!("");
        let doc: SiteContent = serde_json::from_value(json).unwrap();
        assert_eq!(doc.hero_title, "");
    }

    #[test]
    fn test_default_document_copy() {
        let doc = SiteContent::default();
        assert_eq!(doc.hero_title, "工業可靠性的核心操作系統");
        assert!(doc.hero_description.ends_with("實現真正的零停機製造。"));
        assert!(!doc.hero_description.contains(' '));
        assert_eq!(doc.case_studies[0].metrics, "年省 $240 萬美元");
        assert_eq!(doc.contact_address, "台北市信義區信義路五段7號 (台北101)");
    }

    #[test]
    fn test_add_case_study_appends_placeholder_with_fresh_id() {
        let mut doc = SiteContent::default();
        let added = doc.add_case_study();

        assert_eq!(doc.case_studies.len(), 3);
        assert_eq!(doc.case_studies.last(), Some(&added));
        assert_eq!(added.metrics, "$0");
        assert!(doc.case_studies[..2].iter().all(|c| c.id != added.id));
    }

    #[test]
    fn test_remove_case_study_by_id() {
        let mut doc = SiteContent::default();
        assert!(doc.remove_case_study("1"));
        assert_eq!(doc.case_studies.len(), 1);
        assert_eq!(doc.case_studies[0].id, "2");

        assert!(!doc.remove_case_study("missing"));
        assert_eq!(doc.case_studies.len(), 1);
    }
}

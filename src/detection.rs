//! 检测 store 模块
//!
//! 保存当前用户的检测历史、正在查看的检测记录以及统计快照。
//! 所有修改都通过 [`DetectionMutation`] 提交，且只在对应响应到达之后发生。

use crate::api::Gateway;
use crate::error::{ClientError, ClientResult};
use crate::request::HttpClient;
use newscheck_shared::{DetectionRecord, DetectionStats, NewDetection};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionState {
    pub history: Vec<DetectionRecord>,
    pub current: Option<DetectionRecord>,
    pub stats: DetectionStats,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionMutation {
    SetHistory(Vec<DetectionRecord>),
    SetCurrent(Option<DetectionRecord>),
    /// 新记录插到历史最前面
    AddDetection(DetectionRecord),
    SetStats(DetectionStats),
    RemoveDetection(u64),
}

#[derive(Clone, Default)]
pub struct DetectionModule {
    state: Rc<RefCell<DetectionState>>,
}

impl DetectionModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DetectionState {
        self.state.borrow().clone()
    }

    pub fn history(&self) -> Vec<DetectionRecord> {
        self.state.borrow().history.clone()
    }

    pub fn current(&self) -> Option<DetectionRecord> {
        self.state.borrow().current.clone()
    }

    pub fn stats(&self) -> DetectionStats {
        self.state.borrow().stats.clone()
    }

    pub fn commit(&self, mutation: DetectionMutation) {
        let mut state = self.state.borrow_mut();
        match mutation {
            DetectionMutation::SetHistory(history) => state.history = history,
            DetectionMutation::SetCurrent(current) => state.current = current,
            DetectionMutation::AddDetection(record) => state.history.insert(0, record),
            DetectionMutation::SetStats(stats) => state.stats = stats,
            DetectionMutation::RemoveDetection(id) => {
                state.history.retain(|r| r.id != id);
                if state.current.as_ref().is_some_and(|r| r.id == id) {
                    state.current = None;
                }
            }
        }
    }

    // =========================================================
    // Actions
    // =========================================================

    /// 拉取检测历史（分页信封与裸列表都接受）
    pub async fn get_detection_history<C: HttpClient>(
        &self,
        api: &Gateway<C>,
    ) -> ClientResult<Vec<DetectionRecord>> {
        let records = api
            .my_detections()
            .await
            .inspect_err(|e| log::warn!("[Detection] history fetch failed: {}", e))?
            .into_records();
        log::debug!("[Detection] history loaded: {} records", records.len());
        self.commit(DetectionMutation::SetHistory(records.clone()));
        Ok(records)
    }

    /// 拉取单条检测详情
    ///
    /// id 缺失、为空或为字面量 `"undefined"` 时直接拒绝，不发请求。
    pub async fn get_detection_detail<C: HttpClient>(
        &self,
        api: &Gateway<C>,
        id: Option<&str>,
    ) -> ClientResult<DetectionRecord> {
        let id = match id.map(str::trim) {
            Some(id) if !id.is_empty() && id != "undefined" => id,
            other => {
                log::warn!("[Detection] refusing detail fetch for id {:?}", other);
                return Err(ClientError::invalid_input("detection id is missing"));
            }
        };

        let record = api.detection_detail(id).await?;
        self.commit(DetectionMutation::SetCurrent(Some(record.clone())));
        Ok(record)
    }

    /// 提交新检测
    pub async fn create_detection<C: HttpClient>(
        &self,
        api: &Gateway<C>,
        detection: &NewDetection,
    ) -> ClientResult<DetectionRecord> {
        log::info!("[Detection] submitting \"{}\"", detection.title);
        let record = api
            .create_detection(detection)
            .await
            .inspect_err(|e| log::warn!("[Detection] create failed: {}", e))?;
        self.commit(DetectionMutation::AddDetection(record.clone()));
        self.commit(DetectionMutation::SetCurrent(Some(record.clone())));
        Ok(record)
    }

    pub async fn get_detection_result<C: HttpClient>(
        &self,
        api: &Gateway<C>,
        id: &str,
    ) -> ClientResult<DetectionRecord> {
        let record = api.detection_result(id).await?;
        self.commit(DetectionMutation::SetCurrent(Some(record.clone())));
        Ok(record)
    }

    /// 拉取统计快照，管理员查看全站数据
    pub async fn get_detection_stats<C: HttpClient>(
        &self,
        api: &Gateway<C>,
        is_admin: bool,
    ) -> ClientResult<DetectionStats> {
        let stats = api.detection_stats(is_admin).await?;
        self.commit(DetectionMutation::SetStats(stats.clone()));
        Ok(stats)
    }

    pub async fn delete_detection<C: HttpClient>(&self, api: &Gateway<C>, id: u64) -> ClientResult<()> {
        api.delete_detection(id).await?;
        log::info!("[Detection] deleted #{}", id);
        self.commit(DetectionMutation::RemoveDetection(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{HttpMethod, MockHttpClient};
    use newscheck_shared::{DetectionStatus, ImageUpload, Verdict};
    use serde_json::json;

    const BASE: &str = "http://api.test/api";

    fn setup() -> (DetectionModule, Gateway<MockHttpClient>) {
        (DetectionModule::new(), Gateway::new(MockHttpClient::new(), BASE))
    }

    fn url(path: &str) -> String {
        format!("{}{}", BASE, path)
    }

    fn record(id: u64, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "content": "正文",
            "status": "completed",
            "result": "fake",
            "confidence_score": 0.92
        })
    }

    #[tokio::test]
    async fn test_history_accepts_paginated_envelope() {
        let (store, api) = setup();
        api.client().mock_response(
            HttpMethod::Get,
            &url("/detection/detections/my_detections/"),
            200,
            json!({ "count": 2, "next": null, "previous": null, "results": [record(1, "a"), record(2, "b")] }),
        );

        let history = store.get_detection_history(&api).await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(store.history(), history);
        assert!(history[0].is_completed());
        assert!(history[0].is_fake());
    }

    #[tokio::test]
    async fn test_history_accepts_bare_list() {
        let (store, api) = setup();
        api.client().mock_response(
            HttpMethod::Get,
            &url("/detection/detections/my_detections/"),
            200,
            json!([record(3, "c")]),
        );

        let history = store.get_detection_history(&api).await.unwrap();
        assert_eq!(history.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3]);
    }

    #[tokio::test]
    async fn test_history_failure_keeps_previous_state() {
        let (store, api) = setup();
        store.commit(DetectionMutation::SetHistory(vec![
            serde_json::from_value(record(1, "kept")).unwrap(),
        ]));
        api.client().mock_response(
            HttpMethod::Get,
            &url("/detection/detections/my_detections/"),
            500,
            json!({ "detail": "boom" }),
        );

        assert!(store.get_detection_history(&api).await.is_err());
        assert_eq!(store.history()[0].title, "kept");
    }

    #[tokio::test]
    async fn test_detail_rejects_missing_id_without_request() {
        let (store, api) = setup();

        for id in [None, Some(""), Some("undefined")] {
            let err = store.get_detection_detail(&api, id).await.unwrap_err();
            assert!(matches!(err, ClientError::InvalidInput(_)), "{:?}", id);
        }
        assert_eq!(api.client().request_count(), 0);
        assert_eq!(store.current(), None);
    }

    #[tokio::test]
    async fn test_detail_sets_current() {
        let (store, api) = setup();
        api.client()
            .mock_response(HttpMethod::Get, &url("/detection/detections/5/"), 200, record(5, "e"));

        let detail = store.get_detection_detail(&api, Some("5")).await.unwrap();

        assert_eq!(detail.id, 5);
        assert_eq!(store.current(), Some(detail));
    }

    #[tokio::test]
    async fn test_create_prepends_and_sets_current() {
        let (store, api) = setup();
        store.commit(DetectionMutation::SetHistory(vec![
            serde_json::from_value(record(1, "old")).unwrap(),
        ]));
        api.client().mock_response(
            HttpMethod::Post,
            &url("/detection/detections/"),
            201,
            json!({ "id": 9, "title": "新标题", "status": "pending" }),
        );

        let created = store
            .create_detection(
                &api,
                &NewDetection {
                    title: "新标题".into(),
                    content: "新闻正文".into(),
                    image: Some(ImageUpload {
                        file_name: "pic.png".into(),
                        content_type: "image/png".into(),
                        bytes: vec![0x89, b'P', b'N', b'G'],
                    }),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.status, DetectionStatus::Pending);
        assert_eq!(created.result, Verdict::Unknown);
        let history = store.history();
        assert_eq!(history[0], created);
        assert_eq!(history.len(), 2);
        assert_eq!(store.current(), Some(created));

        let sent = api.client().last_request().unwrap();
        assert!(
            sent.headers["Content-Type"].starts_with("multipart/form-data; boundary=")
        );
        let body = sent.body_text();
        assert!(body.contains("name=\"title\""));
        assert!(body.contains("filename=\"pic.png\""));
    }

    #[tokio::test]
    async fn test_concurrent_creates_both_prepend() {
        let (store, api) = setup();
        api.client().mock_response(
            HttpMethod::Post,
            &url("/detection/detections/"),
            201,
            record(11, "same"),
        );
        let draft = NewDetection {
            title: "same".into(),
            content: "x".into(),
            image: None,
        };

        let (a, b) = futures::join!(
            store.create_detection(&api, &draft),
            store.create_detection(&api, &draft)
        );

        assert!(a.is_ok() && b.is_ok());
        // 不做去重：两条都进入历史
        assert_eq!(store.history().len(), 2);
        assert_eq!(api.client().request_count(), 2);
    }

    #[tokio::test]
    async fn test_result_sets_current() {
        let (store, api) = setup();
        api.client().mock_response(
            HttpMethod::Get,
            &url("/detection/detections/4/result/"),
            200,
            json!({ "id": 4, "title": "d", "status": "completed", "result": "real", "confidence_score": 0.7 }),
        );

        let result = store.get_detection_result(&api, "4").await.unwrap();

        assert!(result.is_real());
        assert_eq!(store.current().map(|r| r.id), Some(4));
    }

    #[tokio::test]
    async fn test_stats_all_flag_follows_admin() {
        let (store, api) = setup();
        api.client().mock_response(
            HttpMethod::Get,
            &url("/detection/detections/get_stats/?all=true"),
            200,
            json!({ "total_count": 100, "fake_count": 40, "real_count": 60 }),
        );
        api.client().mock_response(
            HttpMethod::Get,
            &url("/detection/detections/get_stats/"),
            200,
            json!({ "total_count": 3 }),
        );

        let stats = store.get_detection_stats(&api, true).await.unwrap();
        assert_eq!(stats.total_count, 100);
        assert!(api.client().last_request().unwrap().url.ends_with("?all=true"));

        let stats = store.get_detection_stats(&api, false).await.unwrap();
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.fake_count, 0);
        assert!(!api.client().last_request().unwrap().url.contains("all="));
        assert_eq!(store.stats(), stats);
    }

    #[tokio::test]
    async fn test_delete_removes_from_history_and_current() {
        let (store, api) = setup();
        let kept: DetectionRecord = serde_json::from_value(record(1, "keep")).unwrap();
        let doomed: DetectionRecord = serde_json::from_value(record(2, "drop")).unwrap();
        store.commit(DetectionMutation::SetHistory(vec![kept.clone(), doomed.clone()]));
        store.commit(DetectionMutation::SetCurrent(Some(doomed)));
        api.client()
            .mock_empty(HttpMethod::Delete, &url("/detection/detections/2/"), 204);

        store.delete_detection(&api, 2).await.unwrap();

        assert_eq!(store.history(), vec![kept]);
        assert_eq!(store.current(), None);
    }
}

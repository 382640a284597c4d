//! Consultancy request orchestration: builds multi-part generative requests
//! for the salon studio (client photo + optional reference + instruction +
//! declared response schema), submits them through an injected backend, and
//! maps responses onto typed reports or defined errors.

use std::collections::HashMap;
use std::env;
use std::io::Cursor;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use strand_contracts::consultancy::parse_report;
use strand_contracts::events::{EventLog, EventPayload};
use strand_contracts::models::{
    ModelRegistry, CAP_GROUNDED, CAP_IMAGE, CAP_STRUCTURED, CAP_TEXT, CAP_VIDEO,
};
use strand_contracts::{ConsultancyReport, ConsultancyRequest, MediaPart, StudioError};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const TIP_MODEL: &str = "gemini-flash-lite-latest";

/// Raw result of materializing a generated-media URI. The status code is
/// surfaced unmapped so the orchestrator can distinguish an unrecoverable
/// fetch from a transport failure.
#[derive(Debug, Clone)]
pub struct MediaFetch {
    pub status: u16,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// One grounding citation returned alongside a grounded answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingChunk {
    pub title: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GroundedAnswer {
    pub text: String,
    pub chunks: Vec<GroundingChunk>,
}

/// A long-running video generation request. Polling is bounded: the interval
/// and total wait are clamped, and exhausting the budget surfaces
/// `PollTimeout` instead of waiting forever.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub prompt: String,
    pub seed_image: Option<MediaPart>,
    pub resolution: String,
    pub aspect_ratio: String,
    pub poll_interval_s: f64,
    pub poll_timeout_s: f64,
}

impl VideoRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            seed_image: None,
            resolution: "720p".to_string(),
            aspect_ratio: "16:9".to_string(),
            poll_interval_s: 10.0,
            poll_timeout_s: 600.0,
        }
    }

    pub fn with_seed_image(mut self, seed_image: MediaPart) -> Self {
        self.seed_image = Some(seed_image);
        self
    }

    pub fn with_polling(mut self, interval_s: f64, timeout_s: f64) -> Self {
        self.poll_interval_s = interval_s;
        self.poll_timeout_s = timeout_s;
        self
    }
}

#[derive(Debug, Clone)]
pub struct VideoResult {
    pub uri: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
    pub polls: u32,
}

/// State of a long-running media job as reported by its operation handle.
/// A result URI can only exist on a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaJobStatus {
    Pending,
    Done { uri: Option<String> },
}

impl MediaJobStatus {
    pub fn from_operation(operation: &Value) -> Self {
        if operation
            .get("done")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            Self::Done {
                uri: extract_video_uri(operation),
            }
        } else {
            Self::Pending
        }
    }
}

/// Seam to the remote generative endpoint. One process-scoped instance is
/// injected into the studio; tests substitute a scripted fake.
pub trait GenerativeBackend: Send + Sync {
    fn name(&self) -> &str;
    fn generate_content(&self, model: &str, payload: &Value) -> Result<Value>;
    fn submit_video_job(&self, model: &str, payload: &Value) -> Result<Value>;
    fn poll_video_job(&self, operation: &str) -> Result<Value>;
    fn fetch_media(&self, uri: &str) -> Result<MediaFetch>;
}

/// Model names resolved once per studio, one per operation family.
#[derive(Debug, Clone)]
pub struct ModelPlan {
    pub consult: String,
    pub edit: String,
    pub video: String,
    pub grounded: String,
    pub tip: String,
}

impl ModelPlan {
    pub fn from_registry(registry: &ModelRegistry) -> Result<Self> {
        let pick = |capability: &str| -> Result<String> {
            registry
                .resolve(None, capability)
                .map(|model| model.name)
                .map_err(|err| anyhow!(err))
        };
        Ok(Self {
            consult: pick(CAP_STRUCTURED)?,
            edit: pick(CAP_IMAGE)?,
            video: pick(CAP_VIDEO)?,
            grounded: pick(CAP_GROUNDED)?,
            tip: match registry.get(TIP_MODEL) {
                Some(model) => model.name.clone(),
                None => pick(CAP_TEXT)?,
            },
        })
    }
}

impl Default for ModelPlan {
    fn default() -> Self {
        Self {
            consult: "gemini-3-pro-preview".to_string(),
            edit: "gemini-2.5-flash-image".to_string(),
            video: "veo-3.1-fast-generate-preview".to_string(),
            grounded: "gemini-2.5-flash".to_string(),
            tip: TIP_MODEL.to_string(),
        }
    }
}

/// The consultancy request orchestrator. Holds the injected backend, the
/// resolved model plan and the session event log; every operation is a
/// single attempt with no retry, and no state survives between calls.
pub struct Studio {
    backend: Box<dyn GenerativeBackend>,
    models: ModelPlan,
    events: EventLog,
}

impl Studio {
    pub fn new(backend: Box<dyn GenerativeBackend>, events: EventLog) -> Self {
        Self {
            backend,
            models: ModelPlan::default(),
            events,
        }
    }

    pub fn with_models(
        backend: Box<dyn GenerativeBackend>,
        events: EventLog,
        models: ModelPlan,
    ) -> Self {
        Self {
            backend,
            models,
            events,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn models(&self) -> &ModelPlan {
        &self.models
    }

    /// Runs one structured consultancy and returns its validated report.
    /// Either a fully schema-valid report comes back or the call fails;
    /// nothing is retried and nothing partial escapes.
    pub fn consult(
        &self,
        request: &ConsultancyRequest,
    ) -> Result<ConsultancyReport, StudioError> {
        request.ensure_valid()?;

        let mut meta = EventPayload::new();
        meta.insert("kind".to_string(), json!(request.kind.name()));
        meta.insert("has_reference".to_string(), json!(request.reference.is_some()));
        if let Some(brand) = &request.brand {
            meta.insert("brand".to_string(), json!(brand));
        }
        self.events.emit("consultancy_requested", meta)?;

        let payload = consult_payload(request);
        let response = self.backend.generate_content(&self.models.consult, &payload)?;
        let raw = response.to_string();
        let Some(text) = extract_text(&response) else {
            self.events
                .emit_kv("consultancy_failed", "kind", json!(request.kind.name()))?;
            return Err(StudioError::contract_violation(
                "response contained no text part",
                raw,
            ));
        };

        match parse_report(request.kind, &text) {
            Ok(report) => {
                self.events
                    .emit_kv("consultancy_ready", "kind", json!(request.kind.name()))?;
                Ok(report)
            }
            Err(err) => {
                self.events
                    .emit_kv("consultancy_failed", "kind", json!(request.kind.name()))?;
                Err(err)
            }
        }
    }

    /// Applies a visual transformation to the subject photo and returns the
    /// first generated image. The instruction is wrapped in the fixed
    /// realism/identity-preservation template before submission.
    pub fn edit_image(
        &self,
        subject: &MediaPart,
        instruction: &str,
    ) -> Result<MediaPart, StudioError> {
        let prompt = format!(
            "Ultra realistic 8k photo. Apply the following changes to the person in the \
             image: {instruction}. The final image must be photorealistic, with professional \
             studio lighting, soft shadows, and hyperrealistic skin texture. Maintain the \
             original facial identity. Add a subtle catchlight to the eyes for realism."
        );
        self.run_image_call(subject, &prompt, "image_edit")
    }

    /// Renders a full-body look image from a previously generated look
    /// prompt. Kept separate from `consult` so a failed consultancy never
    /// triggers the image call; the caller composes the two.
    pub fn generate_look_image(
        &self,
        subject: &MediaPart,
        technical_prompt: &str,
    ) -> Result<MediaPart, StudioError> {
        let prompt = format!(
            "Ultra realistic 8k full body photo. The final image must be photorealistic, \
             with professional studio lighting, soft shadows, and hyperrealistic skin \
             texture. Maintain the original facial identity and features from the provided \
             image. Create the look as described here: {technical_prompt}. Add a subtle \
             catchlight to the eyes for realism."
        );
        self.run_image_call(subject, &prompt, "look_image")
    }

    fn run_image_call(
        &self,
        subject: &MediaPart,
        prompt: &str,
        label: &str,
    ) -> Result<MediaPart, StudioError> {
        subject.ensure_accepted_input()?;
        self.events
            .emit_kv(&format!("{label}_requested"), "model", json!(self.models.edit))?;

        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [inline_part(subject), {"text": prompt}],
            }],
        });
        let response = self.backend.generate_content(&self.models.edit, &payload)?;
        let raw = response.to_string();

        let Some((mime_type, data)) = extract_inline_parts(&response).into_iter().next() else {
            self.events
                .emit_kv(&format!("{label}_failed"), "reason", json!("no inline media"))?;
            return Err(StudioError::NoMediaInResponse);
        };
        let part =
            MediaPart::from_base64(mime_type.unwrap_or_else(|| "image/png".to_string()), data)
                .map_err(|_| {
                    StudioError::contract_violation("inline media failed to decode", raw)
                })?;
        self.events
            .emit_kv(&format!("{label}_completed"), "mime_type", json!(part.mime_type))?;
        Ok(part)
    }

    /// Submits a video generation job, polls its operation handle at a fixed
    /// interval until the remote reports completion, then fetches the result
    /// exactly once.
    pub fn generate_video(&self, request: &VideoRequest) -> Result<VideoResult, StudioError> {
        if let Some(seed) = &request.seed_image {
            seed.ensure_accepted_input()?;
        }
        let poll_interval_s = request.poll_interval_s.clamp(0.1, 30.0);
        let poll_timeout_s = request.poll_timeout_s.clamp(1.0, 900.0);

        let mut instance = Map::new();
        instance.insert("prompt".to_string(), json!(request.prompt));
        if let Some(seed) = &request.seed_image {
            instance.insert(
                "image".to_string(),
                json!({"bytesBase64Encoded": seed.data, "mimeType": seed.mime_type}),
            );
        }
        let payload = json!({
            "instances": [Value::Object(instance)],
            "parameters": {
                "sampleCount": 1,
                "resolution": request.resolution,
                "aspectRatio": request.aspect_ratio,
            },
        });

        let submitted = self.backend.submit_video_job(&self.models.video, &payload)?;
        let operation = submitted
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                StudioError::contract_violation(
                    "job submission returned no operation handle",
                    submitted.to_string(),
                )
            })?;
        self.events
            .emit_kv("video_job_submitted", "operation", json!(operation))?;

        let started = Instant::now();
        let mut polls = 0u32;
        let mut status = MediaJobStatus::from_operation(&submitted);
        let uri = loop {
            match status {
                MediaJobStatus::Done { uri } => break uri,
                MediaJobStatus::Pending => {
                    if started.elapsed().as_secs_f64() >= poll_timeout_s {
                        return Err(StudioError::PollTimeout {
                            attempts: polls,
                            waited_s: started.elapsed().as_secs_f64(),
                        });
                    }
                    thread::sleep(Duration::from_secs_f64(poll_interval_s));
                    status =
                        MediaJobStatus::from_operation(&self.backend.poll_video_job(&operation)?);
                    polls += 1;
                }
            }
        };
        self.events.emit_kv("video_job_done", "polls", json!(polls))?;

        let uri = uri.ok_or(StudioError::NoMediaInResponse)?;
        let fetched = self.backend.fetch_media(&uri)?;
        if !(200..300).contains(&fetched.status) {
            return Err(StudioError::UnrecoverableFetchFailure {
                status: fetched.status,
                detail: truncate_text(&String::from_utf8_lossy(&fetched.bytes), 512),
            });
        }
        self.events
            .emit_kv("video_fetched", "bytes", json!(fetched.bytes.len()))?;
        Ok(VideoResult {
            uri,
            mime_type: fetched.mime_type,
            bytes: fetched.bytes,
            polls,
        })
    }

    /// Web-search-grounded query: prose plus ordered citations, no schema.
    pub fn search_trends(&self, query: &str) -> Result<GroundedAnswer, StudioError> {
        self.grounded_query(query, None)
    }

    /// Geo-anchored place query grounded on the supplied coordinate.
    pub fn search_places(
        &self,
        query: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<GroundedAnswer, StudioError> {
        self.grounded_query(query, Some((latitude, longitude)))
    }

    fn grounded_query(
        &self,
        query: &str,
        lat_lng: Option<(f64, f64)>,
    ) -> Result<GroundedAnswer, StudioError> {
        let mut payload = Map::new();
        payload.insert(
            "contents".to_string(),
            json!([{"role": "user", "parts": [{"text": query}]}]),
        );
        match lat_lng {
            Some((latitude, longitude)) => {
                payload.insert("tools".to_string(), json!([{"googleMaps": {}}]));
                payload.insert(
                    "toolConfig".to_string(),
                    json!({"retrievalConfig": {"latLng": {
                        "latitude": latitude,
                        "longitude": longitude,
                    }}}),
                );
            }
            None => {
                payload.insert("tools".to_string(), json!([{"googleSearch": {}}]));
            }
        }

        let response = self
            .backend
            .generate_content(&self.models.grounded, &Value::Object(payload))?;
        let text = extract_text(&response).unwrap_or_default();
        let chunks = extract_grounding_chunks(&response);
        self.events.emit_kv(
            "grounded_query",
            "chunks",
            json!(chunks.len()),
        )?;
        Ok(GroundedAnswer { text, chunks })
    }

    /// One short beauty tip from the lite model.
    pub fn quick_tip(&self) -> Result<String, StudioError> {
        let payload = json!({
            "contents": [{"role": "user", "parts": [{"text": QUICK_TIP_PROMPT}]}],
        });
        let response = self.backend.generate_content(&self.models.tip, &payload)?;
        let raw = response.to_string();
        extract_text(&response)
            .ok_or_else(|| StudioError::contract_violation("tip response contained no text", raw))
    }

    /// Opens a stateful assistant conversation; history lives on the
    /// session, not the studio.
    pub fn start_chat(&self) -> ChatSession<'_> {
        ChatSession {
            studio: self,
            history: Vec::new(),
        }
    }
}

/// Multi-turn studio assistant chat. Each send replays the full history so
/// the backend stays stateless.
pub struct ChatSession<'a> {
    studio: &'a Studio,
    history: Vec<Value>,
}

impl ChatSession<'_> {
    pub fn send(&mut self, message: &str) -> Result<String, StudioError> {
        self.history
            .push(json!({"role": "user", "parts": [{"text": message}]}));
        let payload = json!({
            "contents": self.history,
            "systemInstruction": {"parts": [{"text": CHAT_SYSTEM_INSTRUCTION}]},
        });
        let response = self
            .studio
            .backend
            .generate_content(&self.studio.models.consult, &payload);
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                self.history.pop();
                return Err(err.into());
            }
        };
        match extract_text(&response) {
            Some(text) => {
                self.history
                    .push(json!({"role": "model", "parts": [{"text": text}]}));
                Ok(text)
            }
            None => {
                let raw = response.to_string();
                self.history.pop();
                Err(StudioError::contract_violation(
                    "chat response contained no text part",
                    raw,
                ))
            }
        }
    }

    pub fn history(&self) -> &[Value] {
        &self.history
    }
}

const QUICK_TIP_PROMPT: &str = "Give me one short, fascinating beauty or hair-care tip for \
     today. Keep it under 30 words.";

const CHAT_SYSTEM_INSTRUCTION: &str = "You are the intelligent assistant of a smart salon \
     studio. You are an expert in beauty, hair, make-up and style. Help professionals and \
     clients with technical questions, product tips, trends and creative ideas. Always be \
     polite and professional.";

/// HTTP backend for the hosted generative endpoint. Credentials and base URL
/// are read from the environment once, at construction.
pub struct GeminiBackend {
    api_base: String,
    api_key: String,
    http: HttpClient,
    timeout_s: f64,
}

impl GeminiBackend {
    pub fn from_env() -> Result<Self> {
        let Some(api_key) =
            non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("GOOGLE_API_KEY"))
        else {
            bail!("GEMINI_API_KEY or GOOGLE_API_KEY not set");
        };
        let api_base = env::var("GEMINI_API_BASE")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Ok(Self::new(api_base, api_key))
    }

    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            http: HttpClient::new(),
            timeout_s: 90.0,
        }
    }

    pub fn with_timeout(mut self, timeout_s: f64) -> Self {
        self.timeout_s = timeout_s.clamp(15.0, 300.0);
        self
    }

    fn model_endpoint(&self, model: &str, verb: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:{}", self.api_base, model_path, verb)
    }

    fn post_json(&self, endpoint: &str, payload: &Value) -> Result<Value> {
        let response = self
            .http
            .post(endpoint)
            .query(&[("key", self.api_key.as_str())])
            .timeout(Duration::from_secs_f64(self.timeout_s))
            .json(payload)
            .send()
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;
        response_json_or_error(endpoint, response)
    }
}

impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate_content(&self, model: &str, payload: &Value) -> Result<Value> {
        self.post_json(&self.model_endpoint(model, "generateContent"), payload)
    }

    fn submit_video_job(&self, model: &str, payload: &Value) -> Result<Value> {
        self.post_json(&self.model_endpoint(model, "predictLongRunning"), payload)
    }

    fn poll_video_job(&self, operation: &str) -> Result<Value> {
        let endpoint = format!("{}/{}", self.api_base, operation.trim_start_matches('/'));
        let response = self
            .http
            .get(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .timeout(Duration::from_secs_f64(self.timeout_s))
            .send()
            .with_context(|| format!("Gemini poll request failed ({endpoint})"))?;
        response_json_or_error(&endpoint, response)
    }

    fn fetch_media(&self, uri: &str) -> Result<MediaFetch> {
        // Result URIs are pre-signed download links; the key still rides
        // along as a query parameter.
        let response = self
            .http
            .get(uri)
            .query(&[("key", self.api_key.as_str())])
            .timeout(Duration::from_secs_f64(self.timeout_s))
            .send()
            .with_context(|| format!("generated media download failed ({uri})"))?;
        let status = response.status().as_u16();
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .context("failed reading generated media bytes")?
            .to_vec();
        Ok(MediaFetch {
            status,
            mime_type,
            bytes,
        })
    }
}

/// Offline deterministic backend: synthesizes schema-valid reports, a
/// solid-color image for edit calls and a scripted video job. Drives the
/// CLI's dry-run mode and the end-to-end tests.
pub struct DryrunBackend {
    polls_until_done: u32,
    poll_counts: Mutex<HashMap<String, u32>>,
}

impl DryrunBackend {
    pub fn new() -> Self {
        Self {
            polls_until_done: 2,
            poll_counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_polls_until_done(mut self, polls: u32) -> Self {
        self.polls_until_done = polls;
        self
    }

    fn synth_image_response(prompt: &str) -> Result<Value> {
        let (r, g, b) = color_from_prompt(prompt);
        let pixel = RgbImage::from_pixel(1, 1, Rgb([r, g, b]));
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(pixel)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .context("dryrun image encode failed")?;
        Ok(json!({
            "candidates": [{
                "content": {"parts": [{
                    "inlineData": {"mimeType": "image/png", "data": BASE64.encode(png)},
                }]},
            }],
        }))
    }
}

impl Default for DryrunBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerativeBackend for DryrunBackend {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn generate_content(&self, model: &str, payload: &Value) -> Result<Value> {
        let prompt = collect_text_parts(payload);
        if model.contains("image") {
            return Self::synth_image_response(&prompt);
        }
        if let Some(schema) = payload.pointer("/generationConfig/responseSchema") {
            let sample = sample_from_schema(schema);
            return Ok(text_response(&sample.to_string()));
        }
        if payload.get("tools").is_some() {
            let mut response = text_response(&format!("dryrun grounded answer for: {prompt}"));
            response["candidates"][0]["groundingMetadata"] = json!({
                "groundingChunks": [
                    {"web": {"uri": "https://example.com/dryrun", "title": "Dryrun source"}},
                ],
            });
            return Ok(response);
        }
        Ok(text_response(&format!(
            "dryrun response for: {}",
            truncate_text(&prompt, 80)
        )))
    }

    fn submit_video_job(&self, _model: &str, payload: &Value) -> Result<Value> {
        let prompt = payload
            .pointer("/instances/0/prompt")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(json!({"name": format!("operations/dryrun-{}", short_id(prompt))}))
    }

    fn poll_video_job(&self, operation: &str) -> Result<Value> {
        let mut counts = self
            .poll_counts
            .lock()
            .map_err(|_| anyhow!("dryrun poll counter poisoned"))?;
        let count = counts.entry(operation.to_string()).or_insert(0);
        *count += 1;
        if *count >= self.polls_until_done {
            Ok(json!({
                "name": operation,
                "done": true,
                "response": {"generatedVideos": [{
                    "video": {"uri": format!("dryrun://{operation}/video")},
                }]},
            }))
        } else {
            Ok(json!({"name": operation, "done": false}))
        }
    }

    fn fetch_media(&self, _uri: &str) -> Result<MediaFetch> {
        Ok(MediaFetch {
            status: 200,
            mime_type: Some("video/mp4".to_string()),
            bytes: b"dryrun-video".to_vec(),
        })
    }
}

fn consult_payload(request: &ConsultancyRequest) -> Value {
    let mut parts = vec![inline_part(&request.subject)];
    if let Some(reference) = &request.reference {
        parts.push(inline_part(reference));
    }
    if let Some(framing) = request.framing_text() {
        parts.push(json!({"text": framing}));
    }
    parts.push(json!({"text": request.instruction()}));

    let mut payload = Map::new();
    payload.insert(
        "contents".to_string(),
        json!([{"role": "user", "parts": parts}]),
    );

    let mut generation_config = Map::new();
    if let Some(schema) = request.kind.schema(request.brand.as_deref()) {
        generation_config.insert(
            "responseMimeType".to_string(),
            json!("application/json"),
        );
        generation_config.insert("responseSchema".to_string(), schema.to_value());
    }
    if let Some(budget) = request.thinking_budget() {
        generation_config.insert(
            "thinkingConfig".to_string(),
            json!({"thinkingBudget": budget}),
        );
    }
    if !generation_config.is_empty() {
        payload.insert(
            "generationConfig".to_string(),
            Value::Object(generation_config),
        );
    }
    if let Some(system) = request.system_instruction() {
        payload.insert(
            "systemInstruction".to_string(),
            json!({"parts": [{"text": system}]}),
        );
    }
    Value::Object(payload)
}

fn inline_part(part: &MediaPart) -> Value {
    json!({"inlineData": {"mimeType": part.mime_type, "data": part.data}})
}

/// Concatenated text parts of the first candidate, if any.
fn extract_text(response: &Value) -> Option<String> {
    let parts = response
        .pointer("/candidates/0/content/parts")?
        .as_array()?;
    let texts: Vec<&str> = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.concat())
    }
}

/// Every inline media part found across all candidates, as (mime, data)
/// pairs in response order. Tolerates both wire casings.
fn extract_inline_parts(response: &Value) -> Vec<(Option<String>, String)> {
    let candidates = response
        .get("candidates")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut out = Vec::new();
    for candidate in candidates {
        let parts = candidate
            .pointer("/content/parts")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for part in parts {
            let Some(inline) = part
                .get("inlineData")
                .or_else(|| part.get("inline_data"))
                .and_then(Value::as_object)
            else {
                continue;
            };
            let data = inline
                .get("data")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if data.is_empty() {
                continue;
            }
            let mime_type = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str)
                .map(str::to_string);
            out.push((mime_type, data.to_string()));
        }
    }
    out
}

fn extract_video_uri(status: &Value) -> Option<String> {
    let response = status.get("response")?;
    for pointer in [
        "/generatedVideos/0/video/uri",
        "/generateVideoResponse/generatedSamples/0/video/uri",
    ] {
        if let Some(uri) = response
            .pointer(pointer)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
        {
            return Some(uri.to_string());
        }
    }
    None
}

fn extract_grounding_chunks(response: &Value) -> Vec<GroundingChunk> {
    let rows = response
        .pointer("/candidates/0/groundingMetadata/groundingChunks")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    rows.iter()
        .filter_map(|row| {
            let source = row
                .get("web")
                .or_else(|| row.get("maps"))
                .or_else(|| row.get("retrievedContext"))?;
            Some(GroundingChunk {
                title: source.get("title").and_then(Value::as_str).map(str::to_string),
                uri: source.get("uri").and_then(Value::as_str).map(str::to_string),
            })
        })
        .collect()
}

fn collect_text_parts(payload: &Value) -> String {
    let contents = payload
        .get("contents")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut texts = Vec::new();
    for content in contents {
        let parts = content
            .get("parts")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for part in parts {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                texts.push(text.to_string());
            }
        }
    }
    texts.join(" ")
}

/// Builds a minimal JSON value satisfying a wire-form response schema. Used
/// by the dryrun backend so its output survives the real validation path.
fn sample_from_schema(schema: &Value) -> Value {
    match schema.get("type").and_then(Value::as_str).unwrap_or("STRING") {
        "OBJECT" => {
            let mut object = Map::new();
            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for (name, child) in properties {
                    object.insert(name.clone(), sample_from_schema(child));
                }
            }
            Value::Object(object)
        }
        "ARRAY" => {
            let item = schema
                .get("items")
                .map(sample_from_schema)
                .unwrap_or_else(|| json!("dryrun"));
            Value::Array(vec![item])
        }
        _ => {
            let description = schema
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("dryrun");
            Value::String(format!("dryrun: {}", truncate_text(description, 48)))
        }
    }
}

fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}],
    })
}

fn response_json_or_error(endpoint: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("response body read failed ({endpoint})"))?;
    if !status.is_success() {
        bail!(
            "Gemini request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    serde_json::from_str(&body)
        .with_context(|| format!("Gemini returned invalid JSON ({endpoint})"))
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

fn color_from_prompt(prompt: &str) -> (u8, u8, u8) {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    let digest = hasher.finalize();
    (digest[0], digest[1], digest[2])
}

fn short_id(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hex::encode(&hasher.finalize()[..4])
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use base64::Engine as _;
    use serde_json::{json, Value};
    use strand_contracts::events::EventLog;
    use strand_contracts::{ConsultancyKind, ConsultancyRequest, MediaPart, StudioError};

    use super::{
        sample_from_schema, DryrunBackend, GenerativeBackend, MediaFetch, MediaJobStatus, Studio,
        VideoRequest,
    };

    #[derive(Default)]
    struct FakeState {
        replies: Mutex<VecDeque<Value>>,
        generate_calls: Mutex<Vec<(String, Value)>>,
        submit_response: Mutex<Option<Value>>,
        poll_script: Mutex<VecDeque<Value>>,
        poll_calls: Mutex<u32>,
        fetch_response: Mutex<Option<MediaFetch>>,
        fetch_calls: Mutex<u32>,
    }

    #[derive(Clone, Default)]
    struct FakeBackend {
        state: Arc<FakeState>,
    }

    impl FakeBackend {
        fn reply_with(self, reply: Value) -> Self {
            self.state.replies.lock().unwrap().push_back(reply);
            self
        }

        fn submit_with(self, response: Value) -> Self {
            *self.state.submit_response.lock().unwrap() = Some(response);
            self
        }

        fn poll_with(self, script: Vec<Value>) -> Self {
            *self.state.poll_script.lock().unwrap() = script.into();
            self
        }

        fn fetch_with(self, fetched: MediaFetch) -> Self {
            *self.state.fetch_response.lock().unwrap() = Some(fetched);
            self
        }

        fn last_generate_payload(&self) -> (String, Value) {
            self.state
                .generate_calls
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("no generate call recorded")
        }
    }

    impl GenerativeBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        fn generate_content(&self, model: &str, payload: &Value) -> anyhow::Result<Value> {
            self.state
                .generate_calls
                .lock()
                .unwrap()
                .push((model.to_string(), payload.clone()));
            self.state
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted reply"))
        }

        fn submit_video_job(&self, _model: &str, _payload: &Value) -> anyhow::Result<Value> {
            self.state
                .submit_response
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| anyhow::anyhow!("no scripted submission"))
        }

        fn poll_video_job(&self, _operation: &str) -> anyhow::Result<Value> {
            *self.state.poll_calls.lock().unwrap() += 1;
            Ok(self
                .state
                .poll_script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| json!({"done": false})))
        }

        fn fetch_media(&self, _uri: &str) -> anyhow::Result<MediaFetch> {
            *self.state.fetch_calls.lock().unwrap() += 1;
            self.state
                .fetch_response
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| anyhow::anyhow!("no scripted fetch"))
        }
    }

    fn studio_with(backend: FakeBackend) -> (Studio, tempfile::TempDir) {
        let temp = tempfile::tempdir().expect("tempdir");
        let events = EventLog::new(temp.path().join("session.jsonl"), "test-session");
        (Studio::new(Box::new(backend), events), temp)
    }

    fn subject() -> MediaPart {
        MediaPart::from_bytes("image/jpeg", b"client-photo").unwrap()
    }

    fn text_reply(text: &str) -> Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
    }

    fn valid_color_payload() -> Value {
        json!({
            "visagismAnalysis": "cool undertone, pearl works",
            "diagnosis": "level 7, lift to 9.0",
            "highlightingTechnique": "freehand balayage",
            "formula": {"primary": "30g 9.1 + 45g 20vol"},
            "techniqueStepByStep": ["section", "paint", "tone"],
            "troubleshooting": ["too warm: matte toner"],
            "postChemicalCare": ["bond builder weekly"],
        })
    }

    #[test]
    fn consult_prompt_embeds_brand_and_goal_verbatim() -> anyhow::Result<()> {
        let backend = FakeBackend::default().reply_with(text_reply(
            &valid_color_payload().to_string(),
        ));
        let (studio, _temp) = studio_with(backend.clone());

        let request = ConsultancyRequest::new(ConsultancyKind::Color, subject())
            .with_free_text("loiro perolado")
            .with_brand("Wella Professionals");
        studio.consult(&request)?;

        let (model, payload) = backend.last_generate_payload();
        assert_eq!(model, "gemini-3-pro-preview");

        let parts = payload
            .pointer("/contents/0/parts")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let instruction = parts
            .last()
            .and_then(|part| part.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        assert!(instruction.contains("loiro perolado"));
        assert!(instruction.contains("Wella Professionals"));
        assert_eq!(parts[0].pointer("/inlineData/mimeType"), Some(&json!("image/jpeg")));

        assert_eq!(
            payload.pointer("/generationConfig/responseMimeType"),
            Some(&json!("application/json"))
        );
        assert_eq!(
            payload.pointer("/generationConfig/responseSchema/required"),
            Some(&json!([
                "visagismAnalysis",
                "diagnosis",
                "highlightingTechnique",
                "formula",
                "techniqueStepByStep",
                "troubleshooting",
                "postChemicalCare",
            ]))
        );
        Ok(())
    }

    #[test]
    fn consult_missing_required_field_surfaces_contract_violation() {
        let mut payload = valid_color_payload();
        payload.as_object_mut().unwrap().remove("postChemicalCare");
        let raw = payload.to_string();
        let backend = FakeBackend::default().reply_with(text_reply(&raw));
        let (studio, _temp) = studio_with(backend);

        let request = ConsultancyRequest::new(ConsultancyKind::Color, subject())
            .with_free_text("pearl blonde");
        let err = studio.consult(&request).unwrap_err();
        match err {
            StudioError::ResponseContractViolation { reason, raw: attached } => {
                assert!(reason.contains("postChemicalCare"));
                assert_eq!(attached, raw);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn consult_round_trips_matching_payload_verbatim() -> anyhow::Result<()> {
        let payload = valid_color_payload();
        let backend = FakeBackend::default().reply_with(text_reply(&payload.to_string()));
        let (studio, _temp) = studio_with(backend);

        let request = ConsultancyRequest::new(ConsultancyKind::Color, subject())
            .with_free_text("pearl blonde");
        let report = studio.consult(&request)?;
        let color = report.as_color().expect("color report");
        assert_eq!(serde_json::to_value(color)?, payload);
        Ok(())
    }

    #[test]
    fn face_analysis_carries_persona_and_thinking_budget() -> anyhow::Result<()> {
        let reply = json!({
            "consultancy": "oval face, warm skin",
            "palette": [{"hex": "#FF2255", "name": "hot pink"}],
            "cuts": [{"name": "pixie", "description": "opens the face", "technicalPrompt": "p"}],
        });
        let backend = FakeBackend::default().reply_with(text_reply(&reply.to_string()));
        let (studio, _temp) = studio_with(backend.clone());

        let request = ConsultancyRequest::new(ConsultancyKind::FaceAnalysis, subject())
            .with_deep_analysis(true);
        let report = studio.consult(&request)?;
        assert!(report.as_face_analysis().is_some());

        let (_, payload) = backend.last_generate_payload();
        assert!(payload.get("systemInstruction").is_some());
        assert_eq!(
            payload.pointer("/generationConfig/thinkingConfig/thinkingBudget"),
            Some(&json!(16000))
        );
        Ok(())
    }

    #[test]
    fn reference_image_is_second_part_with_framing_text() -> anyhow::Result<()> {
        let backend = FakeBackend::default().reply_with(text_reply(
            &valid_color_payload().to_string(),
        ));
        let (studio, _temp) = studio_with(backend.clone());

        let request = ConsultancyRequest::new(ConsultancyKind::Color, subject())
            .with_reference(MediaPart::from_bytes("image/png", b"reference")?)
            .with_free_text("copper balayage");
        studio.consult(&request)?;

        let (_, payload) = backend.last_generate_payload();
        let parts = payload
            .pointer("/contents/0/parts")
            .and_then(Value::as_array)
            .cloned()
            .unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1].pointer("/inlineData/mimeType"), Some(&json!("image/png")));
        let framing = parts[2]["text"].as_str().unwrap_or_default();
        assert!(framing.contains("first image is the client"));
        Ok(())
    }

    #[test]
    fn edit_image_returns_typed_media_with_data_url_prefix() -> anyhow::Result<()> {
        let reply = json!({
            "candidates": [{"content": {"parts": [
                {"text": "sure, here it is"},
                {"inlineData": {"mimeType": "image/png", "data": super::BASE64.encode(b"png-bytes")}},
            ]}}],
        });
        let backend = FakeBackend::default().reply_with(reply);
        let (studio, _temp) = studio_with(backend.clone());

        let part = studio.edit_image(&subject(), "platinum blonde bob")?;
        assert!(part.to_data_url().starts_with("data:image/png;base64,"));
        assert_eq!(part.decode()?, b"png-bytes");

        let (model, payload) = backend.last_generate_payload();
        assert_eq!(model, "gemini-2.5-flash-image");
        let prompt = payload
            .pointer("/contents/0/parts/1/text")
            .and_then(Value::as_str)
            .unwrap_or_default();
        assert!(prompt.contains("platinum blonde bob"));
        assert!(prompt.contains("Maintain the original facial identity"));
        Ok(())
    }

    #[test]
    fn edit_image_without_inline_media_fails() {
        let backend =
            FakeBackend::default().reply_with(text_reply("cannot produce that image"));
        let (studio, _temp) = studio_with(backend);
        let err = studio.edit_image(&subject(), "mermaid hair").unwrap_err();
        assert!(matches!(err, StudioError::NoMediaInResponse));
    }

    #[test]
    fn video_polls_until_done_then_fetches_exactly_once() -> anyhow::Result<()> {
        let backend = FakeBackend::default()
            .submit_with(json!({"name": "operations/job-1"}))
            .poll_with(vec![
                json!({"done": false}),
                json!({"done": false}),
                json!({
                    "done": true,
                    "response": {"generatedVideos": [{"video": {"uri": "https://cdn/video.mp4"}}]},
                }),
            ])
            .fetch_with(MediaFetch {
                status: 200,
                mime_type: Some("video/mp4".to_string()),
                bytes: b"video-bytes".to_vec(),
            });
        let (studio, _temp) = studio_with(backend.clone());

        let request = VideoRequest::new("slow pan around the new cut").with_polling(0.1, 30.0);
        let result = studio.generate_video(&request)?;

        assert_eq!(result.polls, 3);
        assert_eq!(*backend.state.poll_calls.lock().unwrap(), 3);
        assert_eq!(*backend.state.fetch_calls.lock().unwrap(), 1);
        assert_eq!(result.uri, "https://cdn/video.mp4");
        assert_eq!(result.bytes, b"video-bytes");
        Ok(())
    }

    #[test]
    fn video_done_without_uri_is_no_media() {
        let backend = FakeBackend::default()
            .submit_with(json!({"name": "operations/job-2"}))
            .poll_with(vec![json!({"done": true, "response": {}})]);
        let (studio, _temp) = studio_with(backend.clone());

        let request = VideoRequest::new("prompt").with_polling(0.1, 30.0);
        let err = studio.generate_video(&request).unwrap_err();
        assert!(matches!(err, StudioError::NoMediaInResponse));
        assert_eq!(*backend.state.fetch_calls.lock().unwrap(), 0);
    }

    #[test]
    fn video_result_fetch_failure_is_unrecoverable() {
        let backend = FakeBackend::default()
            .submit_with(json!({"name": "operations/job-3"}))
            .poll_with(vec![json!({
                "done": true,
                "response": {"generatedVideos": [{"video": {"uri": "https://cdn/video.mp4"}}]},
            })])
            .fetch_with(MediaFetch {
                status: 403,
                mime_type: None,
                bytes: b"forbidden".to_vec(),
            });
        let (studio, _temp) = studio_with(backend);

        let request = VideoRequest::new("prompt").with_polling(0.1, 30.0);
        let err = studio.generate_video(&request).unwrap_err();
        match err {
            StudioError::UnrecoverableFetchFailure { status, detail } => {
                assert_eq!(status, 403);
                assert!(detail.contains("forbidden"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn video_polling_is_bounded() {
        // Empty script: every poll reports pending.
        let backend = FakeBackend::default()
            .submit_with(json!({"name": "operations/job-4"}))
            .poll_with(Vec::new());
        let (studio, _temp) = studio_with(backend.clone());

        let request = VideoRequest::new("prompt").with_polling(0.1, 1.0);
        let err = studio.generate_video(&request).unwrap_err();
        match err {
            StudioError::PollTimeout { attempts, waited_s } => {
                assert!(attempts > 0);
                assert!(waited_s >= 1.0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*backend.state.fetch_calls.lock().unwrap(), 0);
    }

    #[test]
    fn places_query_carries_coordinate_config() -> anyhow::Result<()> {
        let reply = json!({
            "candidates": [{
                "content": {"parts": [{"text": "two salons nearby"}]},
                "groundingMetadata": {"groundingChunks": [
                    {"maps": {"uri": "https://maps/place-1", "title": "Salon One"}},
                    {"web": {"uri": "https://example.com", "title": "Trend piece"}},
                ]},
            }],
        });
        let backend = FakeBackend::default().reply_with(reply);
        let (studio, _temp) = studio_with(backend.clone());

        let answer = studio.search_places("best balayage salon", -23.55, -46.63)?;
        assert_eq!(answer.text, "two salons nearby");
        assert_eq!(answer.chunks.len(), 2);
        assert_eq!(answer.chunks[0].title.as_deref(), Some("Salon One"));

        let (model, payload) = backend.last_generate_payload();
        assert_eq!(model, "gemini-2.5-flash");
        assert_eq!(payload["tools"], json!([{"googleMaps": {}}]));
        assert_eq!(
            payload.pointer("/toolConfig/retrievalConfig/latLng/latitude"),
            Some(&json!(-23.55))
        );
        Ok(())
    }

    #[test]
    fn trends_query_uses_web_search_and_tolerates_no_chunks() -> anyhow::Result<()> {
        let backend = FakeBackend::default().reply_with(text_reply("copper is back"));
        let (studio, _temp) = studio_with(backend.clone());

        let answer = studio.search_trends("hair color trends")?;
        assert_eq!(answer.text, "copper is back");
        assert!(answer.chunks.is_empty());

        let (_, payload) = backend.last_generate_payload();
        assert_eq!(payload["tools"], json!([{"googleSearch": {}}]));
        assert!(payload.get("toolConfig").is_none());
        Ok(())
    }

    #[test]
    fn chat_replays_history_and_rolls_back_failed_turns() -> anyhow::Result<()> {
        let backend = FakeBackend::default()
            .reply_with(text_reply("hello! how can I help?"))
            .reply_with(json!({"candidates": []}));
        let (studio, _temp) = studio_with(backend.clone());

        let mut chat = studio.start_chat();
        let first = chat.send("what toner for brassy blonde?")?;
        assert_eq!(first, "hello! how can I help?");
        assert_eq!(chat.history().len(), 2);

        let err = chat.send("and for grey blending?").unwrap_err();
        assert!(matches!(err, StudioError::ResponseContractViolation { .. }));
        // Failed turn removed so a retry does not duplicate the question.
        assert_eq!(chat.history().len(), 2);

        let (_, payload) = backend.last_generate_payload();
        assert_eq!(
            payload["contents"].as_array().map(Vec::len),
            Some(3)
        );
        Ok(())
    }

    #[test]
    fn dryrun_consultancy_survives_real_validation() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events = EventLog::new(temp.path().join("session.jsonl"), "dryrun-session");
        let studio = Studio::new(Box::new(DryrunBackend::new()), events);

        for kind in ConsultancyKind::all() {
            let request = ConsultancyRequest::new(kind, subject())
                .with_free_text("pearl blonde, low maintenance")
                .with_brand("Wella Professionals");
            let report = studio.consult(&request)?;
            let matched = match kind {
                ConsultancyKind::FaceAnalysis => report.as_face_analysis().is_some(),
                ConsultancyKind::Color => report.as_color().is_some(),
                ConsultancyKind::Haircut => report.as_haircut().is_some(),
                ConsultancyKind::Look => report.as_look().is_some(),
                ConsultancyKind::HairTherapy => report.as_hair_therapy().is_some(),
            };
            assert!(matched, "report kind mismatch for {kind}");
        }

        let edited = studio.edit_image(&subject(), "soft copper gloss")?;
        assert_eq!(edited.mime_type, "image/png");

        let video = studio
            .generate_video(&VideoRequest::new("showcase the cut").with_polling(0.1, 30.0))?;
        assert_eq!(video.polls, 2);
        assert_eq!(video.bytes, b"dryrun-video");
        Ok(())
    }

    #[test]
    fn studio_writes_lifecycle_events() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events_path = temp.path().join("session.jsonl");
        let events = EventLog::new(&events_path, "events-session");
        let studio = Studio::new(Box::new(DryrunBackend::new()), events);

        let request = ConsultancyRequest::new(ConsultancyKind::Color, subject())
            .with_free_text("icy blonde");
        studio.consult(&request)?;

        let raw = std::fs::read_to_string(&events_path)?;
        let types: Vec<String> = raw
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .filter_map(|row| row.get("type").and_then(Value::as_str).map(str::to_string))
            .collect();
        assert_eq!(types, ["consultancy_requested", "consultancy_ready"]);
        Ok(())
    }

    #[test]
    fn job_status_carries_uri_only_when_done() {
        let pending = json!({"name": "operations/j", "done": false});
        assert_eq!(MediaJobStatus::from_operation(&pending), MediaJobStatus::Pending);

        let done = json!({
            "done": true,
            "response": {"generatedVideos": [{"video": {"uri": "https://cdn/v.mp4"}}]},
        });
        assert_eq!(
            MediaJobStatus::from_operation(&done),
            MediaJobStatus::Done {
                uri: Some("https://cdn/v.mp4".to_string())
            }
        );

        let done_empty = json!({"done": true, "response": {}});
        assert_eq!(
            MediaJobStatus::from_operation(&done_empty),
            MediaJobStatus::Done { uri: None }
        );
    }

    #[test]
    fn schema_sampler_produces_validating_payloads() {
        let schema = ConsultancyKind::HairTherapy.schema(None).unwrap();
        let sample = sample_from_schema(&schema.to_value());
        assert!(schema.validate(&sample).is_ok());
    }
}

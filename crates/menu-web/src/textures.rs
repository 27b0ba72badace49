use menu_core::{decode_image, ImageLoader, TextureError, TextureSink};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Request, RequestInit, RequestMode, Response};

/// Fetches each image over HTTP(S) and decodes it off the frame path.
#[derive(Default)]
pub struct FetchLoader;

impl ImageLoader for FetchLoader {
    fn request(&mut self, slot: usize, source: &str, sink: TextureSink) {
        let url = source.to_string();
        spawn_local(async move {
            let result = match fetch_bytes(&url).await {
                Ok(bytes) => decode_image(&bytes),
                Err(e) => Err(TextureError::Load(format!("{url}: {e}"))),
            };
            if !sink.is_live() {
                log::debug!("[textures] {url} arrived after teardown");
                return;
            }
            sink.complete(result);
        });
        log::debug!("[textures] slot {slot} <- {source}");
    }
}

pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(url, &opts)
        .map_err(|e| format!("failed to create request: {:?}", e))?;

    let window = web_sys::window().ok_or("no window")?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("fetch failed: {:?}", e))?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| "response is not a Response")?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    let buffer = JsFuture::from(
        resp.array_buffer()
            .map_err(|e| format!("no array buffer: {:?}", e))?,
    )
    .await
    .map_err(|e| format!("read failed: {:?}", e))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

//! The seven `/gt/*` endpoints: form parsing happens here, all the way down
//! into typed values, before anything touches the pipeline; the pipeline
//! itself runs on the worker pool via `run_in_pool` so raster math never
//! blocks the async reactor.

use crate::error::{bad_request, Error, Result};
use crate::state::AppState;
use crate::util::parsing::{
    parse_breaks, parse_bbox, parse_coords, parse_layer_mask, parse_layers, parse_num_breaks,
    parse_poly_mask, parse_resolution, parse_srid, parse_threshold, parse_weights, parse_zoom,
    reproject_extent,
};
use crate::util::user_input::{UserInput, Validated};
use actix_web::{web, HttpResponse, Responder};
use gt_datatypes::raster::{RasterExtent, TileKey};
use gt_operators::analytics::{class_breaks, histogram, is_unable_to_compute, render_png, sample_points};
use gt_operators::catalog::Catalog;
use gt_operators::pipeline::masked_weighted_overlay;
use gt_operators::source::RasterSource;
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;

/// Runs `f` (and anything it fans out over via `rayon`) on the process's
/// bounded worker pool, via `actix_web::web::block` so the async reactor is
/// never blocked waiting for it.
async fn run_in_pool<F, R>(state: &AppState, f: F) -> Result<R>
where
    F: FnOnce() -> gt_operators::Result<R> + Send + 'static,
    R: Send + 'static,
{
    let pool = state.worker_pool.clone();
    web::block(move || pool.install(f))
        .await
        .map_err(|_| Error::WorkerPoolJoin)?
        .map_err(Error::from)
}

/// The native zoom used to read extent-mode windows: the coarsest of the
/// requested layers' native maxima, so every contributing layer has real
/// tile coverage at the chosen zoom rather than some reading only NoData
/// because the window zoom outran their pyramid. Not specified by name in
/// the external interface (extent mode has no `z` path segment); this is
/// the natural reading of "materializes an arbitrary geographic window ...
/// by reading overlapping native tiles" for a multi-layer overlay.
fn resolve_extent_zoom(catalog: &dyn Catalog, layers: &[String]) -> gt_operators::Result<u8> {
    let mut zoom = u8::MAX;
    for layer in layers {
        let metadata = catalog.metadata(layer, 0)?;
        zoom = zoom.min(metadata.max_zoom);
    }
    Ok(zoom)
}

fn color_ramp_name(color_ramp: &Option<String>, palette: &Option<String>) -> Option<String> {
    color_ramp.clone().or_else(|| palette.clone())
}

// ---------------------------------------------------------------- /gt/colors

pub async fn colors(state: web::Data<AppState>) -> impl Responder {
    let ramps: Vec<_> = state.color_ramps.values().collect();
    HttpResponse::Ok().json(ramps)
}

// ---------------------------------------------------------------- /gt/breaks

#[derive(Debug, Clone, Deserialize)]
pub struct BreaksForm {
    pub bbox: String,
    pub layers: String,
    pub weights: String,
    #[serde(default)]
    pub threshold: Option<String>,
    #[serde(default, rename = "polyMask")]
    pub poly_mask: String,
    #[serde(default, rename = "layerMask")]
    pub layer_mask: String,
    pub srid: String,
    #[serde(rename = "numBreaks")]
    pub num_breaks: String,
    #[serde(default)]
    pub resolution: Option<String>,
}

impl UserInput for BreaksForm {
    fn validate(&self) -> Result<()> {
        if self.layers.trim().is_empty() {
            return Err(bad_request("layers must not be empty"));
        }
        Ok(())
    }
}

pub async fn breaks(state: web::Data<AppState>, form: web::Form<BreaksForm>) -> Result<HttpResponse> {
    let form: Validated<BreaksForm> = form.into_inner().validated()?;
    let srid = parse_srid(&form.srid)?;
    let bbox = reproject_extent(parse_bbox(&form.bbox)?, srid)?;
    let layers = parse_layers(&form.layers)?;
    let weights = parse_weights(&form.weights)?;
    let threshold = parse_threshold(form.threshold.as_deref())?;
    let layer_mask = parse_layer_mask(&form.layer_mask);
    let polygons = parse_poly_mask(&form.poly_mask, srid)?;
    let num_breaks = parse_num_breaks(&form.num_breaks)?;
    let resolution = parse_resolution(form.resolution.as_deref(), state.pipeline.default_resolution)?;

    let catalog = state.catalog.clone();
    let raster = run_in_pool(&state, move || {
        let zoom = resolve_extent_zoom(&*catalog, &layers)?;
        let target = RasterExtent::new(bbox, resolution, resolution);
        let source = RasterSource::extent(&*catalog, zoom, target);
        masked_weighted_overlay(&layers, &weights, &polygons, &layer_mask, threshold, &source)
    })
    .await?;

    let breaks = class_breaks(&raster, num_breaks);
    if is_unable_to_compute(&breaks) {
        return Err(gt_operators::Error::UnableToCompute.into());
    }
    Ok(HttpResponse::Ok().json(json!({ "classBreaks": breaks })))
}

// -------------------------------------------------------------------- /gt/wo

#[derive(Debug, Clone, Deserialize)]
pub struct OverlayForm {
    pub bbox: String,
    pub layers: String,
    pub weights: String,
    #[serde(default)]
    pub threshold: Option<String>,
    #[serde(default, rename = "polyMask")]
    pub poly_mask: String,
    #[serde(default, rename = "layerMask")]
    pub layer_mask: String,
    pub srid: String,
    pub breaks: String,
    #[serde(default, rename = "colorRamp")]
    pub color_ramp: Option<String>,
    #[serde(default)]
    pub palette: Option<String>,
}

impl UserInput for OverlayForm {
    fn validate(&self) -> Result<()> {
        if self.layers.trim().is_empty() {
            return Err(bad_request("layers must not be empty"));
        }
        Ok(())
    }
}

pub async fn weighted_overlay_png(
    state: web::Data<AppState>,
    form: web::Form<OverlayForm>,
) -> Result<HttpResponse> {
    let form: Validated<OverlayForm> = form.into_inner().validated()?;
    let srid = parse_srid(&form.srid)?;
    let bbox = reproject_extent(parse_bbox(&form.bbox)?, srid)?;
    let layers = parse_layers(&form.layers)?;
    let weights = parse_weights(&form.weights)?;
    let threshold = parse_threshold(form.threshold.as_deref())?;
    let layer_mask = parse_layer_mask(&form.layer_mask);
    let polygons = parse_poly_mask(&form.poly_mask, srid)?;
    let breaks = parse_breaks(&form.breaks)?;
    let ramp_name = color_ramp_name(&form.color_ramp, &form.palette)
        .unwrap_or_else(|| state.pipeline.default_color_ramp.clone());
    let ramp = state.color_ramp(&ramp_name);
    let resolution = state.pipeline.default_resolution;

    let catalog = state.catalog.clone();
    let png = run_in_pool(&state, move || {
        let zoom = resolve_extent_zoom(&*catalog, &layers)?;
        let target = RasterExtent::new(bbox, resolution, resolution);
        let source = RasterSource::extent(&*catalog, zoom, target);
        let raster = masked_weighted_overlay(&layers, &weights, &polygons, &layer_mask, threshold, &source)?;
        render_png(&raster, &breaks, Some(&ramp))
    })
    .await?;

    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}

// ------------------------------------------------------------------ /gt/tile

#[derive(Debug, Clone, Deserialize)]
pub struct TileForm {
    pub layers: String,
    pub weights: String,
    #[serde(default)]
    pub threshold: Option<String>,
    #[serde(default, rename = "polyMask")]
    pub poly_mask: String,
    #[serde(default, rename = "layerMask")]
    pub layer_mask: String,
    pub srid: String,
    pub breaks: String,
    #[serde(default, rename = "colorRamp")]
    pub color_ramp: Option<String>,
    #[serde(default)]
    pub palette: Option<String>,
}

impl UserInput for TileForm {
    fn validate(&self) -> Result<()> {
        if self.layers.trim().is_empty() {
            return Err(bad_request("layers must not be empty"));
        }
        Ok(())
    }
}

pub async fn tile_png(
    state: web::Data<AppState>,
    path: web::Path<(u8, u32, u32)>,
    form: web::Form<TileForm>,
) -> Result<HttpResponse> {
    let (z, x, y) = path.into_inner();
    let form: Validated<TileForm> = form.into_inner().validated()?;
    let srid = parse_srid(&form.srid)?;
    let layers = parse_layers(&form.layers)?;
    let weights = parse_weights(&form.weights)?;
    let threshold = parse_threshold(form.threshold.as_deref())?;
    let layer_mask = parse_layer_mask(&form.layer_mask);
    let polygons = parse_poly_mask(&form.poly_mask, srid)?;
    let breaks = parse_breaks(&form.breaks)?;
    let ramp_name = color_ramp_name(&form.color_ramp, &form.palette)
        .unwrap_or_else(|| state.pipeline.default_color_ramp.clone());
    let ramp = state.color_ramp(&ramp_name);

    let catalog = state.catalog.clone();
    let key = TileKey::new(z, x, y);
    let png = run_in_pool(&state, move || {
        let source = RasterSource::tile(&*catalog, z, key);
        let raster = masked_weighted_overlay(&layers, &weights, &polygons, &layer_mask, threshold, &source)?;
        render_png(&raster, &breaks, Some(&ramp))
    })
    .await?;

    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}

// ------------------------------------------------------------- /gt/histogram

#[derive(Debug, Clone, Deserialize)]
pub struct HistogramForm {
    pub bbox: String,
    pub layers: String,
    #[serde(default, rename = "polyMask")]
    pub poly_mask: String,
    pub srid: String,
    #[serde(default)]
    pub resolution: Option<String>,
}

impl UserInput for HistogramForm {
    fn validate(&self) -> Result<()> {
        if self.layers.trim().is_empty() {
            return Err(bad_request("layers must not be empty"));
        }
        Ok(())
    }
}

pub async fn histogram_handler(
    state: web::Data<AppState>,
    form: web::Form<HistogramForm>,
) -> Result<HttpResponse> {
    let form: Validated<HistogramForm> = form.into_inner().validated()?;
    let srid = parse_srid(&form.srid)?;
    let bbox = reproject_extent(parse_bbox(&form.bbox)?, srid)?;
    let layers = parse_layers(&form.layers)?;
    let [layer] = <[String; 1]>::try_from(layers).map_err(|layers| {
        bad_request(format!("histogram takes exactly one layer, got {}", layers.len()))
    })?;
    let polygons = parse_poly_mask(&form.poly_mask, srid)?;
    let resolution = parse_resolution(form.resolution.as_deref(), state.pipeline.default_resolution)?;

    let started = Instant::now();
    let catalog = state.catalog.clone();
    let counts = run_in_pool(&state, move || {
        let zoom = resolve_extent_zoom(&*catalog, std::slice::from_ref(&layer))?;
        let target = RasterExtent::new(bbox, resolution, resolution);
        let source = RasterSource::extent(&*catalog, zoom, target);
        let raster = source.fetch(&layer)?;
        Ok(histogram(&raster, &polygons))
    })
    .await?;
    let elapsed = started.elapsed();

    let counts: std::collections::HashMap<String, u64> =
        counts.into_iter().map(|(value, count)| (value.to_string(), count)).collect();
    Ok(HttpResponse::Ok().json(json!({
        "elapsed": format!("{}ms", elapsed.as_millis()),
        "histogram": counts,
    })))
}

// ----------------------------------------------------- /gt/value, /gt/spark/value

#[derive(Debug, Clone, Deserialize)]
pub struct ValueForm {
    pub layers: String,
    pub zoom: String,
    pub coords: String,
    pub srid: String,
}

impl UserInput for ValueForm {
    fn validate(&self) -> Result<()> {
        if self.layers.trim().is_empty() {
            return Err(bad_request("layers must not be empty"));
        }
        Ok(())
    }
}

/// Shared by `/gt/value` and `/gt/spark/value`: both return the same
/// `{"coords": [[id,x,y,value],...]}` shape, so both routes are registered
/// against this one handler.
pub async fn value(state: web::Data<AppState>, form: web::Form<ValueForm>) -> Result<HttpResponse> {
    let form: Validated<ValueForm> = form.into_inner().validated()?;
    let srid = parse_srid(&form.srid)?;
    let layers = parse_layers(&form.layers)?;
    let [layer] = <[String; 1]>::try_from(layers)
        .map_err(|layers| bad_request(format!("value sampling takes exactly one layer, got {}", layers.len())))?;
    let zoom = parse_zoom(&form.zoom)?;
    let points = parse_coords(&form.coords)?;

    let catalog = state.catalog.clone();
    let samples =
        run_in_pool(&state, move || sample_points(&*catalog, &layer, zoom, &points, srid)).await?;

    let coords: Vec<_> = samples
        .into_iter()
        .map(|(id, x, y, value)| json!([id, x, y, value]))
        .collect();
    Ok(HttpResponse::Ok().json(json!({ "coords": coords })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use gt_operators::catalog::MockCatalog;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let catalog: Arc<dyn Catalog> = Arc::new(
            MockCatalog::new()
                .with_constant_layer("L1", 16, 5)
                .with_constant_layer("A", 16, 2)
                .with_constant_layer("B", 16, 3),
        );
        AppState::new(
            catalog,
            gt_operators::concurrency::WorkerPool::new(2).unwrap(),
            crate::config::Pipeline {
                default_resolution: 16,
                default_color_ramp: "blue-to-red".to_string(),
                worker_threads: 2,
            },
        )
    }

    #[actix_web::test]
    async fn trivial_breaks_matches_scenario_s1() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .route("/gt/breaks", web::post().to(breaks)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/gt/breaks")
            .set_form(&[
                ("bbox", "-100,-100,100,100"),
                ("layers", "L1"),
                ("weights", "1"),
                ("numBreaks", "3"),
                ("srid", "3857"),
            ])
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["classBreaks"], json!([5]));
    }

    #[actix_web::test]
    async fn weighted_sum_matches_scenario_s2() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .route("/gt/breaks", web::post().to(breaks)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/gt/breaks")
            .set_form(&[
                ("bbox", "-100,-100,100,100"),
                ("layers", "A,B"),
                ("weights", "2,1"),
                ("numBreaks", "2"),
                ("srid", "3857"),
            ])
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["classBreaks"], json!([7]));
    }

    #[actix_web::test]
    async fn all_no_data_breaks_is_500_domain_fault() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .route("/gt/breaks", web::post().to(breaks)),
        )
        .await;

        // A bbox far outside any layer's coverage still returns all-NoData
        // rather than an error from the pipeline itself; only breaks' own
        // `UnableToCompute` should fire here, so use a layer the mock never
        // registers any coverage gap for and instead force it via threshold.
        let req = test::TestRequest::post()
            .uri("/gt/breaks")
            .set_form(&[
                ("bbox", "-100,-100,100,100"),
                ("layers", "L1"),
                ("weights", "1"),
                ("numBreaks", "3"),
                ("srid", "3857"),
                ("threshold", "100"),
            ])
            .to_request();
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn point_sample_matches_scenario_s6() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .route("/gt/value", web::post().to(value)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/gt/value")
            .set_form(&[
                ("layers", "L1"),
                ("zoom", "4"),
                ("coords", "id1,0,0"),
                ("srid", "3857"),
            ])
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["coords"][0][0], "id1");
        assert_eq!(body["coords"][0][3], 5);
    }

    #[actix_web::test]
    async fn colors_lists_the_built_in_ramps() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .route("/gt/colors", web::get().to(colors)),
        )
        .await;

        let req = test::TestRequest::get().uri("/gt/colors").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body.as_array().unwrap().iter().any(|r| r["name"] == "blue-to-red"));
    }

    #[actix_web::test]
    async fn weighted_overlay_png_decodes_to_the_requested_grid() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .route("/gt/wo", web::post().to(weighted_overlay_png)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/gt/wo")
            .set_form(&[
                ("bbox", "-100,-100,100,100"),
                ("layers", "L1"),
                ("weights", "1"),
                ("breaks", "5"),
                ("srid", "3857"),
            ])
            .to_request();
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap().to_str().unwrap().to_string();
        let body = test::read_body(response).await;
        let decoded = image::load_from_memory(&body).unwrap();
        assert_eq!(content_type, "image/png");
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 16);
    }
}

use utoipa::OpenApi;
use utoipauto::utoipauto;

#[utoipauto]
#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "Vendor Dashboard API", description = "Vendor dashboard endpoints")
    ),
)]
pub struct ApiDoc {}

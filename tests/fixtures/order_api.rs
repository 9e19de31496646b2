pub struct Order {
    pub id: u64,
    pub total: f64,
    pub paid: bool,
    pub note: Option<String>,
}

pub struct OrderService;

impl OrderService {
    #[api_operation(summary = "Fetch an order")]
    #[api_route(method = "get", path = "/orders/{orderId}")]
    #[api_param(name = "orderId", type = "integer")]
    #[api_response(status = 200, schema = "Order")]
    #[api_tag(name = "orders", external_docs_url = "https://docs.example.com/orders")]
    pub fn fetch_order(&self) {}

    #[api_operation(summary = "Export orders")]
    #[api_response(status = 200, type = "string", content_type = "text/csv")]
    pub fn export_orders(&self) {}

    pub fn recalculate(&self) {}
}

#[api_operation(summary = "Update order status")]
#[api_route(path = "/orders/{orderId}")]
#[api_param(name = "orderId", type = "integer")]
#[api_response(status = 200, description = "Updated", colour = "green")]
#[api_response(status = 200, description = "Updated again")]
pub fn update_order_status() {}

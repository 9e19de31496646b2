use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(rename = "emailAddress")]
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub profile: Profile,
    #[serde(skip)]
    pub password_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Profile {
    pub bio: String,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub age: u32,
}

#[api_operation(summary = "Get user by ID", tags("users"))]
#[api_param(name = "userId", type = "string", description = "User ID")]
#[api_response(status = 200, schema = "User", description = "The user")]
#[api_response(status = 404, description = "User not found")]
pub async fn get_user_handler() {}

#[api_operation(summary = "List users", operation_id = "listUsers")]
#[api_query(name = "page", type = "integer", example = 1)]
#[api_query(name = "sort", type = "string", enum_values("asc", "desc"))]
#[api_response(status = 200, type = "array")]
#[api_tag(name = "users", description = "User management")]
pub async fn list_users_handler() {}

#[api_operation(summary = "Create user")]
#[api_body(schema = "NewUser", required = true, example = r#"{"name": "Ada", "age": 36}"#)]
#[api_response(status = 201, schema = "User")]
#[api_response(status = 400)]
#[api_security(scheme_type = "http", name = "bearerAuth", scheme = "bearer")]
pub async fn create_user_handler() {}

#[api_operation(summary = "Delete user", deprecated)]
#[api_route(path = "/users/{userId}")]
#[api_param(name = "userId", type = "string")]
#[api_response(status = 204, description = "Deleted")]
#[api_security(scheme_type = "apiKey", name = "X-Api-Key", location = "header")]
pub async fn delete_user_handler() {}

pub fn format_user_name(user: &User) -> String {
    user.name.clone()
}

use crate::models::ApiEndpoint;

pub const SYSTEM_PROMPT: &str = "You are an expert at finding API documentation. \
    Provide accurate, current information about public APIs. Respond only with valid JSON.";

pub fn initial_prompt(company_name: &str) -> String {
    format!(
        r#"Find the actual API endpoints for {company_name}'s public API. I need:
1. Does the company have a public API? (true/false)
2. API type (REST, GraphQL, SOAP, etc.)
3. Base URL for the API
4. 15-20 of the most important endpoints with their HTTP methods, paths, descriptions and parameters

Respond ONLY with valid JSON in this exact format:
{{
    "company_name": "{company_name}",
    "has_api": true,
    "api_type": "REST",
    "base_url": "https://api.example.com/v1",
    "endpoints": [
        {{"method": "GET", "path": "/users", "description": "Retrieve list of users", "parameters": [{{"name": "limit", "type": "integer", "required": false}}]}},
        {{"method": "POST", "path": "/users", "description": "Create a new user", "parameters": [{{"name": "email", "type": "string", "required": true}}]}},
        {{"method": "GET", "path": "/users/{{id}}", "description": "Get user by ID", "parameters": [{{"name": "id", "type": "string", "required": true}}]}}
    ]
}}

If no public API exists, set has_api to false and use empty strings/arrays."#
    )
}

/// Asks for `batch` more endpoints, listing up to `exclusion_limit` known ones to skip.
pub fn follow_up_prompt(
    company_name: &str,
    known: &[ApiEndpoint],
    batch: usize,
    exclusion_limit: usize,
) -> String {
    let listed = known
        .iter()
        .take(exclusion_limit)
        .map(|endpoint| format!("- {}", endpoint.full_endpoint()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"List {batch} more endpoints of {company_name}'s public API that are NOT already in this list:
{listed}

Respond ONLY with valid JSON in this exact format:
{{
    "endpoints": [
        {{"method": "GET", "path": "/example", "description": "What it does", "parameters": [{{"name": "id", "type": "string", "required": true}}]}}
    ]
}}

If there are no further endpoints, return {{"endpoints": []}}."#
    )
}

//! Default TOML config template with inline documentation comments.

use crate::schema::CONFIG_SCHEMA_VERSION;

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    let header = format!(
        "# chatmeter configuration\n\
         # Only override what you want to change -- missing fields use defaults.\n\
         \n\
         schema_version = {CONFIG_SCHEMA_VERSION}\n"
    );
    header
        + r##"
[api]
# api_key = "sk-..."            # falls back to $OPENAI_API_KEY
# base_url = "https://api.openai.com/v1"
# connect_timeout_secs = 10     # 1-600
# request_timeout_secs = 120    # 1-600, requests are never retried

[models]
# text = "gpt-3.5-turbo"
# embedding = "text-embedding-ada-002"

[session]
# interactive = true            # false makes every call one-shot
# system_prompt = "You are a helpful assistant."

[cache]
# path = "/path/to/cache.json"  # default: <data dir>/chatmeter/cache.json
# auto_load = true
# auto_save = true

# Price overrides in USD per 1000 tokens. Rows replace built-ins by model name.
# [[pricing]]
# model = "gpt-4"
# kind = "text"                 # text, embedding
# input_per_1k = 0.03
# output_per_1k = 0.06
"##
}

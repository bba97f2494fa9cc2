//! Template-message management endpoints.

use serde_json::json;

use crate::error::WechatError;
use crate::mp::rest::client::{ApiRequest, MpRestClient};
use crate::mp::rest::endpoints::template;
use crate::mp::rest::types::{Ack, AddTemplateResponse, IndustryInfo, TemplateList};

impl MpRestClient {
    /// Set the account's industries by industry code.
    pub async fn set_industry(
        &self,
        industry_id1: u32,
        industry_id2: u32,
    ) -> Result<Ack, WechatError> {
        self.execute(ApiRequest::post(
            template::SET_INDUSTRY,
            json!({
                "industry_id1": industry_id1,
                "industry_id2": industry_id2,
            }),
        ))
        .await
    }

    /// Get the industries currently configured for the account.
    pub async fn get_industry(&self) -> Result<IndustryInfo, WechatError> {
        self.execute(ApiRequest::get(template::GET_INDUSTRY)).await
    }

    /// Obtain a template ID from the template library.
    ///
    /// `template_id_short` is the library code, e.g. `TM00001` or
    /// `OPENTM200000001`.
    pub async fn add_template(
        &self,
        template_id_short: &str,
    ) -> Result<AddTemplateResponse, WechatError> {
        self.execute(ApiRequest::post(
            template::ADD_TEMPLATE,
            json!({ "template_id_short": template_id_short }),
        ))
        .await
    }

    /// List all templates owned by the account.
    pub async fn get_all_private_templates(&self) -> Result<TemplateList, WechatError> {
        self.execute(ApiRequest::get(template::ALL_PRIVATE_TEMPLATES))
            .await
    }

    /// Delete a template from the account.
    pub async fn del_private_template(&self, template_id: &str) -> Result<Ack, WechatError> {
        self.execute(ApiRequest::post(
            template::DEL_PRIVATE_TEMPLATE,
            json!({ "template_id": template_id }),
        ))
        .await
    }
}

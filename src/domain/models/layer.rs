#[cfg(test)]
#[path = "layer_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::ExternalId;
use super::StructureFormat;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum LayerType {
    #[serde(rename = "protein_fold")]
    #[strum(serialize = "protein_fold")]
    ProteinFold,
    #[serde(rename = "molecule_3d", alias = "molecule_3d_sdf")]
    #[strum(serialize = "molecule_3d")]
    Molecule3d,
    #[serde(rename = "protein_3d", alias = "protein_3d_pdb")]
    #[strum(serialize = "protein_3d")]
    Protein3d,
    #[serde(rename = "generic_text")]
    #[strum(serialize = "generic_text")]
    GenericText,
}

impl LayerType {
    pub fn for_format(format: StructureFormat) -> LayerType {
        match format {
            StructureFormat::Sdf => return LayerType::Molecule3d,
            StructureFormat::Pdb => return LayerType::Protein3d,
        }
    }

    pub fn default_components(&self) -> Vec<LayerComponent> {
        let (id, name) = match self {
            LayerType::Molecule3d => ("molecule", "Molecule"),
            LayerType::Protein3d | LayerType::ProteinFold => ("protein", "Protein"),
            LayerType::GenericText => ("text", "Text Response"),
        };

        return vec![LayerComponent {
            id: id.to_string(),
            name: name.to_string(),
            visible: true,
        }];
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LayerStatus {
    Pending,
    Loaded,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerComponent {
    pub id: String,
    pub name: String,
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationLayer {
    pub layer_id: String,
    pub prompt_message_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    /// Structure text when loaded, a human readable reason on error.
    pub data: Option<String>,
    pub status: LayerStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<ExternalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    /// Mean pLDDT for predicted structures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub components: Vec<LayerComponent>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewLayer {
    pub prompt_message_id: String,
    pub name: String,
    pub layer_type: LayerType,
    pub data: Option<String>,
    pub status: LayerStatus,
    pub external_id: Option<ExternalId>,
    pub external_url: Option<String>,
    pub confidence: Option<f64>,
}

impl NewLayer {
    pub fn pending(prompt_message_id: &str, name: &str, layer_type: LayerType) -> NewLayer {
        return NewLayer {
            prompt_message_id: prompt_message_id.to_string(),
            name: name.to_string(),
            layer_type,
            data: None,
            status: LayerStatus::Pending,
            external_id: None,
            external_url: None,
            confidence: None,
        };
    }

    pub fn loaded(
        prompt_message_id: &str,
        name: &str,
        layer_type: LayerType,
        data: String,
    ) -> NewLayer {
        return NewLayer {
            data: Some(data),
            status: LayerStatus::Loaded,
            ..NewLayer::pending(prompt_message_id, name, layer_type)
        };
    }

    pub fn into_layer(self) -> VisualizationLayer {
        return VisualizationLayer {
            layer_id: Uuid::new_v4().to_string(),
            prompt_message_id: self.prompt_message_id,
            name: self.name,
            components: self.layer_type.default_components(),
            layer_type: self.layer_type,
            data: self.data,
            status: self.status,
            timestamp: Utc::now(),
            external_id: self.external_id,
            external_url: self.external_url,
            confidence: self.confidence,
        };
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerPatch {
    pub name: Option<String>,
    pub layer_type: Option<LayerType>,
    pub data: Option<String>,
    pub status: Option<LayerStatus>,
    pub external_id: Option<ExternalId>,
    pub external_url: Option<String>,
    pub confidence: Option<f64>,
}

impl LayerPatch {
    pub fn error(reason: &str) -> LayerPatch {
        return LayerPatch {
            data: Some(reason.to_string()),
            status: Some(LayerStatus::Error),
            ..LayerPatch::default()
        };
    }

    pub fn apply(self, layer: &mut VisualizationLayer) {
        if let Some(name) = self.name {
            layer.name = name;
        }
        if let Some(layer_type) = self.layer_type {
            if layer_type != layer.layer_type {
                layer.components = layer_type.default_components();
            }
            layer.layer_type = layer_type;
        }
        if let Some(data) = self.data {
            layer.data = Some(data);
        }
        if let Some(status) = self.status {
            layer.status = status;
        }
        if let Some(external_id) = self.external_id {
            layer.external_id = Some(external_id);
        }
        if let Some(external_url) = self.external_url {
            layer.external_url = Some(external_url);
        }
        if let Some(confidence) = self.confidence {
            layer.confidence = Some(confidence);
        }
        layer.timestamp = Utc::now();
    }
}

impl From<NewLayer> for LayerPatch {
    fn from(layer: NewLayer) -> LayerPatch {
        return LayerPatch {
            name: Some(layer.name),
            layer_type: Some(layer.layer_type),
            data: layer.data,
            status: Some(layer.status),
            external_id: layer.external_id,
            external_url: layer.external_url,
            confidence: layer.confidence,
        };
    }
}

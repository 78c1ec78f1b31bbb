/// Instruction sent alongside every image.
pub const EXTRACTION_PROMPT: &str = r#"You are a sophisticated traffic violation detection AI.
Analyze this image and provide the following information in JSON format:
1. vehicleNumber: Extract the license plate number clearly. If not visible, return "Not detected".
2. violationType: Identify the most likely traffic violation (e.g., Speeding, Red Light, No Helmet, Triple Riding, Wrong Parking).
3. confidence: A number between 0-100 representing your confidence level.

Return ONLY the JSON object.
Example: {"vehicleNumber": "MH12AB1234", "violationType": "No Helmet", "confidence": 92}"#;

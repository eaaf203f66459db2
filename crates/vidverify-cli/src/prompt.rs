//! The analysis prompt.

use clap::ValueEnum;

/// Language the prompt is written in. The model usually answers in the
/// same language, and the output labels follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PromptLanguage {
    #[default]
    En,
    Zh,
}

pub fn build_prompt(language: PromptLanguage) -> String {
    match language {
        PromptLanguage::En => PROMPT_EN.trim().to_string(),
        PromptLanguage::Zh => PROMPT_ZH.trim().to_string(),
    }
}

const PROMPT_EN: &str = r#"
Analyze this live video in detail and decide whether the person in the reference photo appears in the video as a real, live person.

**Core task: identity confirmation from biometric features, backed by timestamped evidence**
**Only immutable biometric features count. Ignore everything a person can change.**
**Every conclusion must cite timestamps that can be captured as visual evidence.**

**Step 1: extract biometric features from the reference photo**
Consider only intrinsic features (ignore hairstyle, clothing, glasses, jewellery and makeup):
1. **Bone structure**:
   - skull shape and proportions (length to width, forehead height)
   - face outline (square, round, oval, heart)
   - cheekbone height and prominence
   - jawline and chin shape
2. **Intrinsic facial features**:
   - nose bridge shape, nostril width, nose tip shape
   - lip thickness ratio, mouth corner shape, philtrum depth
   - brow ridge structure, distance between the brows
   - ear shape and earlobes (if visible)
3. **Facial proportions**:
   - vertical thirds and horizontal fifths
   - eye distance relative to face width
   - nose length relative to face length

**Step 2: liveness detection and biometric comparison in the video**
For every segment of the video, check all of the following.

A. **Liveness indicators**:
   - natural changes of expression and micro-expressions
   - blink rate and how natural blinking looks
   - lip movement in sync with the voice
   - three-dimensional head turns and changes of angle
   - natural movement of the facial muscles

B. **Anti-spoofing checks**:
   - signs of a flat photo: edge glare, unnatural shadows
   - whether the depth relation between person and surroundings is real
   - whether light reflects naturally on the face
   - traces of a screen: visible pixels, refresh artifacts

C. **Biometric matching**:
   - compare the bone structure extracted above
   - verify that the intrinsic feature shapes agree
   - estimate how well the facial proportions match

**Step 3: evidence collection (mandatory)**
**Whatever the conclusion, you must provide timestamps as evidence.**

A. **If it is the same person**:
   - give 3-5 timestamps with the closest resemblance (clearest frontal views)
   - state which biometric feature each timestamp demonstrates
   - biometric similarity score (1-10)
   - liveness confidence (1-10)

B. **If it is a different person**:
   - give 3-5 representative timestamps of the main person in the video
   - state the key difference from the reference photo at each timestamp
   - focus on the biometric features that do not match

C. **If you are uncertain**:
   - give the timestamps that cause the uncertainty
   - state which features are similar and which differ
   - explain why no clear conclusion is possible

**Step 4: explain each timestamp (required)**
For each timestamp, state:
1. **Reason**: why this moment was chosen
2. **Features shown**: the key biometric features visible in the frame
3. **Comparison**: the concrete result of comparing it with the reference photo
4. **Evidential value**: how the frame supports the final conclusion

**Step 5: overall judgement**
Based on the evidence, give:
- a clear verdict (same person / different person / uncertain)
- an overall confidence (1-10)
- a summary of the key evidence

**Spoofing risk levels**:
- low risk: natural movement, real interaction
- medium risk: some movements look stiff
- high risk: probably a photo or a screen

**Output format:**
After your analysis, list the following on separate lines:
EVIDENCE_TIMESTAMPS: [timestamp1, timestamp2, timestamp3...]
LIVENESS_SCORE: X/10
BIOMETRIC_SCORE: X/10
SPOOFING_RISK_SCORE: X/10 (1-3 low risk, 4-6 medium risk, 7-10 high risk)
OVERALL_CONFIDENCE: X/10
MATCH_VERDICT: SAME_PERSON | DIFFERENT_PERSON | UNCERTAIN

**Timestamp precision:**
- give frame-accurate timestamps in the format MM:SS.FF or HH:MM:SS.FF
- FF is the frame number within that second (00:09.15 means frame 15 of second 9)
- this locates the exact frame for the most accurate evidence still
- if you cannot tell the frame, use MM:SS.00

Begin your biometric analysis.
"#;

const PROMPT_ZH: &str = r#"
我需要你详细分析这个直播视频，判断参考照片中的人物是否以真人形式出现在视频中。

**核心任务：基于生物特征的身份确认 + 截图证据支撑**
**重要：仅关注不可变的生物特征，排除所有可变外在因素**
**必要：每个结论都必须提供时间戳截图作为可视化证据**

**第一步：参考照片生物特征提取**
请仅分析以下固有特征（忽略发型、服装、眼镜、饰品、妆容等）：
1. **骨骼结构特征**：
   - 头颅形状和比例（长宽比、前额高度）
   - 脸型轮廓（方形/圆形/椭圆形/心形）
   - 颧骨高度和突出程度
   - 下颌线条和下巴形状
2. **五官固有特征**：
   - 鼻梁形状（直/弯曲）、鼻翼宽度、鼻头形状
   - 嘴唇厚度比例、嘴角形状、人中深度
   - 眉骨结构、眉间距离
   - 耳廓形状和耳垂特征（如果可见）
3. **面部比例关系**：
   - 三庭五眼比例
   - 眼距与面宽比例
   - 鼻长与面长比例

**第二步：视频活体检测与生物特征对比**
逐段分析视频时，必须同时验证：

A. **活体真实性指标**：
   - 自然的面部表情变化和微表情
   - 眨眼频率和自然程度
   - 说话时口型与声音的同步性
   - 头部的三维转动和角度变化
   - 面部肌肉的自然运动

B. **防伪检测**：
   - 检查是否存在平面照片特征：边缘反光、不自然的阴影
   - 观察人物与环境的深度关系是否真实
   - 验证光线在面部的自然反射效果
   - 检测是否有屏幕显示痕迹（像素点、刷新频率）

C. **生物特征匹配**：
   - 对比上述提取的骨骼结构特征
   - 验证五官固有形状是否一致
   - 计算面部比例关系的匹配度

**第三步：证据收集（强制要求）**
**重要：无论结论如何，都必须提供时间戳截图作为证据**

A. **如果判断为同一人**：
   - 提供3-5个最相似的时间戳（最清晰的正面角度）
   - 每个时间戳说明证明的具体生物特征
   - 生物特征相似度评分（1-10分）
   - 活体检测置信度（1-10分）

B. **如果判断为不同人**：
   - 提供3-5个视频中主要人物的代表性时间戳
   - 每个时间戳说明与参考照片的关键差异
   - 重点展示不匹配的生物特征证据

C. **如果判断不确定**：
   - 提供导致不确定的关键时间戳
   - 说明哪些特征相似，哪些特征不同
   - 解释为什么无法得出明确结论

**第四步：时间戳证据说明（必填）**
对每个提供的时间戳，必须说明：
1. **选择理由**：为什么选择这个时间点
2. **特征展示**：该截图显示的关键生物特征
3. **对比结论**：与参考照片的具体对比结果
4. **证据价值**：该截图对最终结论的支撑作用

**第五步：综合判断**
基于截图证据得出最终结论：
- 明确的判断结论（是/否/不确定）
- 整体置信度（1-10分）
- 关键证据总结

**防伪警告级别**：
- 低风险：自然动作，真实交互
- 中风险：部分动作略显僵硬
- 高风险：疑似照片或屏幕显示

**输出格式要求：**
在分析结论后，请单独列出：
证据时间戳: [时间戳1, 时间戳2, 时间戳3...]
活体检测评分: X/10
生物特征评分: X/10
伪造风险评分: X/10 (1-3分为低风险，4-6分为中风险，7-10分为高风险)
整体置信度: X/10
判断结论: 是/否/不确定

**时间戳精度要求：**
- 请提供帧级精确时间戳，格式：MM:SS.FF 或 HH:MM:SS.FF
- 其中FF表示该秒内的帧数（例如：00:09.15 表示第9秒的第15帧）
- 这样可以精确定位到具体帧，提供最准确的截图证据
- 如果无法确定具体帧数，可使用 MM:SS.00 格式

请开始你的专业生物识别分析。
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_prompt_lists_output_block() {
        let prompt = build_prompt(PromptLanguage::En);
        for label in [
            "EVIDENCE_TIMESTAMPS: [",
            "LIVENESS_SCORE: X/10",
            "BIOMETRIC_SCORE: X/10",
            "SPOOFING_RISK_SCORE: X/10",
            "OVERALL_CONFIDENCE: X/10",
            "MATCH_VERDICT:",
        ] {
            assert!(prompt.contains(label), "missing {label}");
        }
        assert!(prompt.contains("MM:SS.FF"));
    }

    #[test]
    fn test_chinese_prompt_lists_output_block() {
        let prompt = build_prompt(PromptLanguage::Zh);
        for label in [
            "证据时间戳: [",
            "活体检测评分: X/10",
            "生物特征评分: X/10",
            "伪造风险评分: X/10",
            "整体置信度: X/10",
            "判断结论: 是/否/不确定",
        ] {
            assert!(prompt.contains(label), "missing {label}");
        }
    }

    #[test]
    fn test_prompt_is_trimmed() {
        let prompt = build_prompt(PromptLanguage::default());
        assert!(prompt.starts_with("Analyze"));
        assert!(prompt.ends_with("analysis."));
    }
}

use serde::{Deserialize, Serialize};

/// Уникальный идентификатор объекта в сцене
pub type ObjectId = String;

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    1
}

fn default_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

/// Параметры вызова инструмента дублирования по поверхности
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOptions {
    /// true — ориентировать копию по нормали поверхности,
    /// false — сохранить исходную ориентацию объекта
    #[serde(default = "default_true")]
    pub rotation: bool,
    /// true — создавать инстанс (общая геометрия), false — независимую копию
    #[serde(default)]
    pub instance_leaf: bool,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            rotation: true,
            instance_leaf: false,
        }
    }
}

/// Тип примитива
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    /// Плоскость в XZ с нормалью +Y
    Plane {
        width: f64,
        depth: f64,
        #[serde(default = "default_subdivisions")]
        subdivisions: u32,
    },
    Cube {
        width: f64,
        height: f64,
        depth: f64,
    },
}

fn default_subdivisions() -> u32 {
    1
}

/// Трансформация объекта (углы поворота в градусах, порядок XYZ)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default = "default_scale")]
    pub scale: [f64; 3],
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    pub fn at(position: [f64; 3]) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Описание объекта сцены
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescription {
    /// Имя объекта (используется как аргумент команды)
    pub name: String,
    /// Геометрия; None — пустой трансформ без сетки
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive: Option<Primitive>,
    #[serde(default)]
    pub transform: Transform,
    /// Сдвиг (shear) трансформа
    #[serde(default)]
    pub shear: [f64; 3],
    /// Локальная точка вращения (rotate pivot)
    #[serde(default)]
    pub pivot: [f64; 3],
}

impl ObjectDescription {
    pub fn new(name: impl Into<String>, primitive: Option<Primitive>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            primitive,
            transform,
            shear: [0.0; 3],
            pivot: [0.0; 3],
        }
    }
}

/// Описание сцены — набор объектов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            version: 1,
            objects: Vec::new(),
        }
    }
}

impl SceneDescription {
    /// Найти объект по имени
    pub fn find(&self, name: &str) -> Option<&ObjectDescription> {
        self.objects.iter().find(|o| o.name == name)
    }
}
